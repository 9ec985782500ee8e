pub mod member_search;
