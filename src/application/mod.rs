// Application layer - Use cases and repository seams
pub mod dashboard_service;
pub mod point_of_sale_service;
pub mod reading_repository;
