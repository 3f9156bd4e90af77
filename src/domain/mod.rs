// Domain layer - pure classification and aggregation engine
pub mod aggregation;
pub mod classification;
pub mod dashboard;
pub mod metric;
pub mod point_of_sale;
pub mod sensor;
pub mod severity;
