// Point of sale domain model
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct PointOfSale {
    pub id: String,
    pub name: String,
}

impl PointOfSale {
    pub fn new(id: String) -> Self {
        let name = Self::format_name(&id);
        Self { id, name }
    }

    fn format_name(id: &str) -> String {
        // Convert "Planta_Centro_" to "Planta Centro"
        id.trim_end_matches('_').replace('_', " ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_name() {
        let pos = PointOfSale::new("Planta_Centro_".to_string());
        assert_eq!(pos.name, "Planta Centro");

        let pos = PointOfSale::new("Kiosko_12".to_string());
        assert_eq!(pos.name, "Kiosko 12");
    }
}
