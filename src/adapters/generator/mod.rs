//! Response generator adapters.

mod template;

pub use template::TemplateResponseGenerator;
