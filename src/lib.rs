pub mod attachment;
pub mod comment;
pub mod config;
pub mod db;
pub mod follow;
pub mod group;
pub mod middleware;
pub mod orm;
pub mod paginator;
pub mod post;
pub mod session;
pub mod user;
pub mod validation;
pub mod web;
