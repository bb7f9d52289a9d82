use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One sale as the API returns it.
/// Field names are fixed by the upstream JSON; anything else in the
/// payload (freight, rating, payment type...) is ignored.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RawRecord {
    #[serde(rename = "Preço")]
    pub price: f64,

    /// Purchase date in DD/MM/YYYY
    #[serde(rename = "Data da Compra")]
    pub purchase_date: String,

    #[serde(rename = "Local da compra")]
    pub state: String,

    #[serde(rename = "lat")]
    pub lat: f64,

    #[serde(rename = "lon")]
    pub lon: f64,

    #[serde(rename = "Categoria do Produto")]
    pub category: String,

    #[serde(rename = "Vendedor")]
    pub seller: String,
}

/// A normalized sale: same data, with the purchase date parsed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sale {
    pub price: f64,
    pub purchase_date: NaiveDate,
    pub state: String,
    pub lat: f64,
    pub lon: f64,
    pub category: String,
    pub seller: String,
}

impl RawRecord {
    /// Builder used by tests and the static source
    pub fn new(price: f64, purchase_date: &str, state: &str, category: &str, seller: &str) -> Self {
        RawRecord {
            price,
            purchase_date: purchase_date.to_string(),
            state: state.to_string(),
            lat: 0.0,
            lon: 0.0,
            category: category.to_string(),
            seller: seller.to_string(),
        }
    }

    pub fn with_coordinates(mut self, lat: f64, lon: f64) -> Self {
        self.lat = lat;
        self.lon = lon;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_api_payload() {
        let json = r#"[{
            "Produto": "Modelagem preditiva",
            "Categoria do Produto": "livros",
            "Preço": 92.45,
            "Frete": 5.6,
            "Data da Compra": "01/01/2020",
            "Vendedor": "Thiago Silva",
            "Local da compra": "BA",
            "Avaliação da compra": 1,
            "Tipo de pagamento": "cartao_credito",
            "Quantidade de parcelas": 3,
            "lat": -13.29,
            "lon": -41.71
        }]"#;

        let records: Vec<RawRecord> = serde_json::from_str(json).unwrap();

        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.price, 92.45);
        assert_eq!(r.purchase_date, "01/01/2020");
        assert_eq!(r.state, "BA");
        assert_eq!(r.category, "livros");
        assert_eq!(r.seller, "Thiago Silva");
        assert_eq!(r.lat, -13.29);
        assert_eq!(r.lon, -41.71);
    }

    #[test]
    fn test_missing_field_is_rejected() {
        let json = r#"[{"Preço": 10.0, "Data da Compra": "01/01/2020"}]"#;
        assert!(serde_json::from_str::<Vec<RawRecord>>(json).is_err());
    }
}
