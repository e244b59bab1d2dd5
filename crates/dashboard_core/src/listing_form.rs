use std::{
    str::FromStr,
    time::{Duration, Instant},
};

use rust_decimal::Decimal;
use shared::{
    domain::Category,
    error::DashboardError,
    protocol::{NewProduct, Product},
};
use url::Url;

/// How long the "listed successfully" banner stays up.
pub const SUCCESS_BANNER_TTL: Duration = Duration::from_secs(3);

pub const SUCCESS_MESSAGE: &str = "Product listed successfully!";

/// Raw text the seller typed, kept verbatim until submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFields {
    pub username: String,
    pub name: String,
    pub price: String,
    pub original_price: String,
    pub brand: String,
    pub category: Option<Category>,
    pub image: String,
}

impl ProductFields {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Checks every field and builds the insert payload.
    ///
    /// Prices must be non-negative decimals with at most two fractional
    /// digits; `original_price` below `price` is accepted.
    pub fn validate(&self) -> Result<NewProduct, DashboardError> {
        let username = required(&self.username, "Username")?;
        let name = required(&self.name, "Product name")?;
        let price = parse_price(&self.price, "Price")?;
        let original_price = parse_price(&self.original_price, "Original price")?;
        let brand = required(&self.brand, "Brand")?;
        let category = self
            .category
            .ok_or_else(|| DashboardError::user_input("Category is required"))?;
        let image = required(&self.image, "Image URL")?;
        let image_url = Url::parse(&image)
            .map_err(|_| DashboardError::user_input("Image URL must be an absolute URL"))?;
        if !matches!(image_url.scheme(), "http" | "https") {
            return Err(DashboardError::user_input("Image URL must use http or https"));
        }

        Ok(NewProduct {
            username,
            name,
            price,
            original_price,
            image,
            brand,
            category,
        })
    }
}

fn required(value: &str, label: &str) -> Result<String, DashboardError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DashboardError::user_input(format!("{label} is required")));
    }
    Ok(value.to_string())
}

fn parse_price(raw: &str, label: &str) -> Result<Decimal, DashboardError> {
    let raw = required(raw, label)?;
    let price = Decimal::from_str(&raw)
        .map_err(|_| DashboardError::user_input(format!("{label} must be a number")))?;
    if price.is_sign_negative() && !price.is_zero() {
        return Err(DashboardError::user_input(format!(
            "{label} must not be negative"
        )));
    }
    if price.normalize().scale() > 2 {
        return Err(DashboardError::user_input(format!(
            "{label} must have at most two decimal places"
        )));
    }
    Ok(price)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success { shown_at: Instant },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct ListingForm {
    pub fields: ProductFields,
    state: SubmissionState,
}

impl Default for ListingForm {
    fn default() -> Self {
        Self {
            fields: ProductFields::default(),
            state: SubmissionState::Idle,
        }
    }
}

impl ListingForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        self.state == SubmissionState::Submitting
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn success_visible(&self) -> bool {
        matches!(self.state, SubmissionState::Success { .. })
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting() {
            "Adding Product..."
        } else {
            "List Product"
        }
    }

    /// Starts a submission. Returns the row to insert, or `None` when a
    /// submission is already running or the fields do not validate (the
    /// form then shows the validation message).
    pub fn submit(&mut self) -> Option<NewProduct> {
        if self.is_submitting() {
            return None;
        }
        self.state = SubmissionState::Idle;
        match self.fields.validate() {
            Ok(product) => {
                self.state = SubmissionState::Submitting;
                Some(product)
            }
            Err(err) => {
                self.state = SubmissionState::Failed(err.to_string());
                None
            }
        }
    }

    /// Records the insert outcome. Returns `true` when the product was
    /// stored, in which case the fields are cleared; on failure they are
    /// kept so the seller can correct and resubmit.
    pub fn finish(&mut self, result: &Result<Product, DashboardError>, now: Instant) -> bool {
        match result {
            Ok(_) => {
                self.fields = ProductFields::default();
                self.state = SubmissionState::Success { shown_at: now };
                true
            }
            Err(err) => {
                self.state = SubmissionState::Failed(err.to_string());
                false
            }
        }
    }

    /// Clears the success banner once it has been visible long enough.
    pub fn expire_banner(&mut self, now: Instant) {
        if let SubmissionState::Success { shown_at } = self.state {
            if now.saturating_duration_since(shown_at) >= SUCCESS_BANNER_TTL {
                self.state = SubmissionState::Idle;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> ProductFields {
        ProductFields {
            username: "alice".into(),
            name: "Hoe".into(),
            price: "12.50".into(),
            original_price: "15.00".into(),
            brand: "AcmeTools".into(),
            category: Some(Category::Tools),
            image: "https://x/y.jpg".into(),
        }
    }

    #[test]
    fn valid_fields_build_insert_payload() {
        let product = filled().validate().expect("valid");
        assert_eq!(product.price, Decimal::from_str("12.50").unwrap());
        assert_eq!(product.original_price, Decimal::from_str("15").unwrap());
        assert_eq!(product.category, Category::Tools);
    }

    #[test]
    fn non_numeric_price_is_rejected_before_submission() {
        let mut form = ListingForm::new();
        form.fields = filled();
        form.fields.price = "twelve".into();
        assert!(form.submit().is_none());
        assert_eq!(form.error(), Some("Price must be a number"));
        assert_eq!(form.fields.price, "twelve");
    }

    #[test]
    fn rejects_negative_and_over_precise_prices() {
        let mut fields = filled();
        fields.original_price = "-1".into();
        assert_eq!(
            fields.validate().unwrap_err(),
            DashboardError::UserInput("Original price must not be negative".into())
        );

        fields.original_price = "1.005".into();
        assert_eq!(
            fields.validate().unwrap_err(),
            DashboardError::UserInput("Original price must have at most two decimal places".into())
        );

        fields.original_price = "1.500".into();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn discount_inversion_is_accepted() {
        let mut fields = filled();
        fields.original_price = "1.00".into();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn missing_category_and_relative_image_are_rejected() {
        let mut fields = filled();
        fields.category = None;
        assert_eq!(
            fields.validate().unwrap_err().message(),
            "Category is required"
        );

        let mut fields = filled();
        fields.image = "y.jpg".into();
        assert_eq!(
            fields.validate().unwrap_err().message(),
            "Image URL must be an absolute URL"
        );
    }

    #[test]
    fn non_web_image_schemes_are_rejected() {
        for image in ["javascript:alert(1)", "mailto:a@b.example", "data:image/png;base64,AAAA"] {
            let mut fields = filled();
            fields.image = image.into();
            assert_eq!(
                fields.validate().unwrap_err().message(),
                "Image URL must use http or https",
                "{image}"
            );
        }

        let mut fields = filled();
        fields.image = "http://cdn.example/hoe.png".into();
        assert!(fields.validate().is_ok());
    }

    #[test]
    fn second_submit_while_submitting_is_ignored() {
        let mut form = ListingForm::new();
        form.fields = filled();
        assert!(form.submit().is_some());
        assert_eq!(form.submit_label(), "Adding Product...");
        assert!(form.submit().is_none());
        assert!(form.is_submitting());
    }

    #[test]
    fn failure_retains_fields_and_success_clears_them() {
        let now = Instant::now();
        let mut form = ListingForm::new();
        form.fields = filled();
        form.submit();
        let failed = form.finish(&Err(DashboardError::Transport("offline".into())), now);
        assert!(!failed);
        assert_eq!(form.error(), Some("offline"));
        assert_eq!(form.fields, filled());
    }

    #[test]
    fn success_banner_expires_after_three_seconds() {
        let now = Instant::now();
        let mut form = ListingForm::new();
        form.fields = filled();
        form.submit();
        let product = Product {
            id: "p-1".into(),
            username: "alice".into(),
            name: "Hoe".into(),
            price: Decimal::from_str("12.50").unwrap(),
            original_price: Decimal::from_str("15.00").unwrap(),
            image: "https://x/y.jpg".into(),
            brand: "AcmeTools".into(),
            category: Category::Tools,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        };
        assert!(form.finish(&Ok(product), now));
        assert!(form.fields.is_empty());

        form.expire_banner(now + Duration::from_millis(2_999));
        assert!(form.success_visible());

        form.expire_banner(now + SUCCESS_BANNER_TTL);
        assert!(!form.success_visible());
        assert_eq!(form.state(), &SubmissionState::Idle);
    }
}
