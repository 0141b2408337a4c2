//! `easyway-catalog`: catalog records exchanged with the backend.
//!
//! Categories, sub-categories and products, the draft payloads the dashboard
//! submits (with their client-side validation rules), and the pagination
//! envelope shared by every list endpoint.

pub mod category;
pub mod page;
pub mod product;

pub use category::{Category, CategoryDraft, Subcategory, SubcategoryDraft};
pub use page::{Page, PageQuery, ResultsEnvelope};
pub use product::{Product, ProductDraft, ProductImages, ProductStatus};
