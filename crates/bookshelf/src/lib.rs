//! Interactive front end for the bookshelf catalog

mod menu;

pub use menu::*;
