pub mod dto;
pub mod handlers;
pub mod images;
pub mod model;
pub mod repo;
