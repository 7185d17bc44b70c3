mod json_view;
mod review_component;

pub use json_view::highlight_json;
pub use review_component::ReviewComponent;
