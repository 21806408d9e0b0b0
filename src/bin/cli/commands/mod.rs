pub mod card;
pub mod deck;
pub mod key;
pub mod note;
pub mod review;
