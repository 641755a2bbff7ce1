use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PlantForm {
    pub plant_name: String,
    pub variety: String,
    #[serde(rename = "photo")]
    pub photo_url: String,
    pub date_planted: String,
}

#[derive(Debug, Deserialize)]
pub struct HarvestForm {
    pub harvested_amount: String,
    pub date_harvested: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plant_form_uses_html_field_names() {
        let form: PlantForm = serde_json::from_value(serde_json::json!({
            "plant_name": "Tomato",
            "variety": "Roma",
            "photo": "https://example.com/tomato.jpg",
            "date_planted": "2026-04-01",
        }))
        .unwrap();
        assert_eq!(form.photo_url, "https://example.com/tomato.jpg");
    }
}
