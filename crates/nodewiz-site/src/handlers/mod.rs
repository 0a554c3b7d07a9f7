pub mod admin;
pub mod contact;
pub mod pages;
pub mod seo;
pub mod testimonials;
