use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, Utc};
use reqwest::{header::CONTENT_TYPE, Client};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{instrument, Level};
use url::Url;

use crate::{
    config::Config,
    error::{Error, Result},
    menu::{DayOfWeek, Meal, MealType, MenuItem, Restaurant, Won},
    parse::{CellOutcome, NO_MENU_NOTE},
};

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const DEFAULT_IMAGE_MIME_TYPE: &str = "image/jpeg";
const PROMPT: &str = "이 식단표 이미지의 모든 식사를 스키마에 맞는 JSON 배열로 추출하세요.";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrItem {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub description: Option<String>,
}

impl OcrItem {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn price(&self) -> Option<Won> {
        self.price
            .filter(|price| price.is_finite() && *price >= 0.0 && *price <= f64::from(u32::MAX))
            .map(|price| Won::new(price.round() as u32))
    }

    fn into_menu_item(self) -> Option<MenuItem> {
        let price = self.price();
        let notes = self.description.filter(|d| !d.trim().is_empty());
        MenuItem::single(self.name?.trim())
            .map(|item| item.with_price(price).with_notes(notes))
    }
}

/// One meal as the model reported it. Fields the model left out are `None`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrMeal {
    pub restaurant: Option<Restaurant>,
    pub day: Option<DayOfWeek>,
    pub meal_type: Option<MealType>,
    #[serde(default)]
    pub items: Vec<OcrItem>,
}

impl OcrMeal {
    /// `None` when the meal cannot be placed (restaurant, day or meal type missing).
    /// Items without a name are dropped; a meal left with no items is unavailable.
    pub fn into_meal(self, updated_at: DateTime<Utc>) -> Option<Meal> {
        let items: Vec<MenuItem> = self
            .items
            .into_iter()
            .filter_map(OcrItem::into_menu_item)
            .collect();
        let outcome = if items.is_empty() {
            CellOutcome::Unavailable {
                notes: Some(NO_MENU_NOTE.to_string()),
            }
        } else {
            CellOutcome::Open(items)
        };
        Some(Meal::new(
            self.restaurant?,
            self.day?,
            self.meal_type?,
            outcome,
            updated_at,
        ))
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

/// The JSON schema the model's answer must follow.
pub fn response_schema() -> Value {
    let restaurants: Vec<&str> = Restaurant::ALL.iter().map(|r| r.label()).collect();
    let days: Vec<&str> = DayOfWeek::ALL.iter().map(|d| d.as_str()).collect();
    json!({
        "type": "ARRAY",
        "items": {
            "type": "OBJECT",
            "properties": {
                "restaurant": { "type": "STRING", "enum": restaurants },
                "day": { "type": "STRING", "enum": days },
                "mealType": { "type": "STRING", "enum": ["breakfast", "lunch", "dinner"] },
                "items": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "name": { "type": "STRING" },
                            "price": { "type": "NUMBER" },
                            "description": { "type": "STRING" },
                        },
                    },
                },
            },
        },
    })
}

/// Image bytes as the API takes them inline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    mime_type: String,
    data: String,
}

impl InlineImage {
    pub fn new(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: STANDARD.encode(bytes),
        }
    }
}

pub fn request_body(image: &InlineImage) -> Value {
    json!({
        "contents": [{
            "role": "user",
            "parts": [
                { "text": PROMPT },
                { "inlineData": { "mimeType": image.mime_type, "data": image.data } },
            ],
        }],
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": response_schema(),
        },
    })
}

/// Meals in the text of the first candidate.
fn meals_from_response(body: &str) -> Result<Vec<OcrMeal>> {
    let response: GenerateContentResponse = serde_json::from_str(body)?;
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| content.parts.into_iter().filter_map(|part| part.text).collect())
        .ok_or_else(|| Error::Ocr("response has no candidate content".to_string()))?;
    serde_json::from_str(&text).map_err(From::from)
}

#[derive(Debug, Clone)]
pub struct OcrClient {
    client: Client,
    api_key: String,
    model: String,
}

impl OcrClient {
    pub fn new(client: Client, api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Result<Self> {
        let api_key = config
            .gemini_api_key
            .clone()
            .ok_or_else(|| Error::Config("GEMINI_API_KEY is required for OCR".to_string()))?;
        Ok(Self::new(client, api_key, config.gemini_model.clone()))
    }

    fn endpoint(&self) -> String {
        format!("{API_BASE}/{}:generateContent", self.model)
    }

    async fn fetch_image(&self, image_url: &Url) -> Result<InlineImage> {
        let res = self
            .client
            .get(image_url.clone())
            .send()
            .await?
            .error_for_status()?;
        let mime_type = res
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::trim)
            .filter(|value| value.starts_with("image/"))
            .unwrap_or(DEFAULT_IMAGE_MIME_TYPE)
            .to_string();
        let bytes = res.bytes().await?;
        if bytes.is_empty() {
            return Err(Error::Ocr(format!("{image_url} returned no image data")));
        }
        log::trace!("Fetched {} bytes of {mime_type} from {image_url}", bytes.len());
        Ok(InlineImage::new(mime_type, &bytes))
    }

    #[instrument(skip(self, image_url), fields(image_url = %image_url, model = %self.model), level = Level::TRACE)]
    pub async fn extract(&self, image_url: &Url) -> Result<Vec<OcrMeal>> {
        let image = self.fetch_image(image_url).await?;
        let res = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request_body(&image))
            .send()
            .await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(Error::Ocr(format!("{status}: {body}")));
        }
        meals_from_response(&body)
    }

    /// [`Self::extract`], keeping only meals that name their restaurant, day and meal type.
    pub async fn extract_meals(&self, image_url: &Url) -> Result<Vec<Meal>> {
        let updated_at = Utc::now();
        let meals: Vec<Meal> = self
            .extract(image_url)
            .await?
            .into_iter()
            .filter_map(|meal| meal.into_meal(updated_at))
            .collect();
        log::info!("OCR of {image_url} gave {} meals", meals.len());
        Ok(meals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::tests::serve_once;
    use crate::menu::Status;
    use chrono::TimeZone;

    const RESPONSE: &str = r#"{
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{
                    "text": "[{\"restaurant\":\"누리터식당\",\"day\":\"tue\",\"mealType\":\"lunch\",\"items\":[{\"name\":\"제육덮밥\",\"price\":5500,\"description\":\"매콤\"},{\"price\":1000},{\"name\":\"요구르트\"}]},{\"restaurant\":\"경영관 D-flex\",\"day\":\"tue\",\"mealType\":\"dinner\",\"items\":[]},{\"day\":\"wed\",\"items\":[]}]"
                }]
            },
            "finishReason": "STOP"
        }]
    }"#;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 3, 0, 0).unwrap()
    }

    #[test]
    fn test_schema_enums() {
        let schema = response_schema();
        let restaurants = schema["items"]["properties"]["restaurant"]["enum"]
            .as_array()
            .unwrap();
        assert_eq!(restaurants.len(), 10);
        assert_eq!(restaurants[0], "상록원3층식당 - 집밥");
        assert_eq!(restaurants[9], "경영관 D-flex");
        assert_eq!(
            schema["items"]["properties"]["day"]["enum"],
            json!(["mon", "tue", "wed", "thu", "fri", "sat", "sun"])
        );
        assert_eq!(
            schema["items"]["properties"]["mealType"]["enum"],
            json!(["breakfast", "lunch", "dinner"])
        );
        assert_eq!(
            schema["items"]["properties"]["items"]["items"]["properties"]["price"]["type"],
            "NUMBER"
        );
    }

    #[test]
    fn test_request_body() {
        let image = InlineImage::new("image/png", &[0x89, b'P', b'N', b'G']);
        let body = request_body(&image);
        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["text"], PROMPT);
        let inline = &parts[1]["inlineData"];
        assert_eq!(inline["mimeType"], "image/png");
        assert_eq!(inline["data"], "iVBORw==");
        assert!(parts[1].get("fileData").is_none());
        assert_eq!(body["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(body["generationConfig"]["responseSchema"], response_schema());
    }

    #[test]
    fn test_inline_image_encodes_whole_payload() {
        let bytes: Vec<u8> = (0..=255).collect();
        let image = InlineImage::new(DEFAULT_IMAGE_MIME_TYPE, &bytes);
        assert_eq!(STANDARD.decode(&image.data).unwrap(), bytes);
        assert_eq!(image.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_fetch_image() {
        let ocr = OcrClient::new(Client::new(), "key", "model");
        let url: Url = serve_once("image/png", vec![1, 2, 3]).parse().unwrap();
        let image = ocr.fetch_image(&url).await.unwrap();
        assert_eq!(image, InlineImage::new("image/png", &[1, 2, 3]));
        assert_eq!(image.data, "AQID");

        let url: Url = serve_once("application/octet-stream", vec![1]).parse().unwrap();
        assert_eq!(ocr.fetch_image(&url).await.unwrap().mime_type, DEFAULT_IMAGE_MIME_TYPE);

        let url: Url = serve_once("image/png", Vec::new()).parse().unwrap();
        assert!(matches!(ocr.fetch_image(&url).await, Err(Error::Ocr(_))));
    }

    #[test]
    fn test_meals_from_response() {
        let meals = meals_from_response(RESPONSE).unwrap();
        assert_eq!(meals.len(), 3);
        assert_eq!(meals[0].restaurant, Some(Restaurant::Nuriter));
        assert_eq!(meals[0].items.len(), 3);
        assert_eq!(meals[2].restaurant, None);
    }

    #[test]
    fn test_into_meal() {
        let mut meals = meals_from_response(RESPONSE).unwrap().into_iter();

        let lunch = meals.next().unwrap().into_meal(stamp()).unwrap();
        assert_eq!(lunch.status(), Status::Open);
        assert_eq!(lunch.day(), DayOfWeek::Tue);
        let items = lunch.items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].name(), ["제육덮밥"]);
        assert_eq!(items[0].price(), Some(Won::new(5500)));
        assert_eq!(items[0].notes(), Some("매콤"));
        assert_eq!(items[1].price(), None);

        let dinner = meals.next().unwrap().into_meal(stamp()).unwrap();
        assert_eq!(dinner.status(), Status::Unavailable);
        assert_eq!(dinner.items(), None);

        assert!(meals.next().unwrap().into_meal(stamp()).is_none());
    }

    #[test]
    fn test_response_without_candidates() {
        assert!(matches!(
            meals_from_response(r#"{"candidates": []}"#),
            Err(Error::Ocr(_))
        ));
    }

    #[test]
    fn test_negative_price_is_dropped() {
        let item = OcrItem {
            name: Some("물".to_string()),
            price: Some(-1.0),
            description: None,
        };
        assert_eq!(item.into_menu_item().unwrap().price(), None);
    }
}
