pub mod auth;
pub mod catalog;
pub mod contacts;
pub mod content;
pub mod image;
pub mod media;
pub mod portfolio;
pub mod products;
pub mod references;
pub mod settings;
pub mod slug;
pub mod storage;
