pub mod report_render;

pub use report_render::render_report;
