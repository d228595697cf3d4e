pub mod public_helpers;
pub mod sanitization_helpers;
pub mod seo_helpers;
pub mod youtube_helpers;
