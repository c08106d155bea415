pub mod services;

pub use services::{upload_receipt, ReceiptUpload};
