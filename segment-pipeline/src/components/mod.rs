pub mod grade_filter;
pub mod net_category_filter;
pub mod top_n_selector;
pub mod username_filter;
pub mod vip_filter;
