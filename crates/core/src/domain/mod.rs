pub mod customer;
pub mod quotation;
pub mod rating;
pub mod vehicle;
