//! Body models of the demo routes.
//!
//! Each model exists twice: as a [`Schema`] the validator checks incoming JSON
//! against, and as a serde struct the handler works with once the body is valid.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Number;

use crate::schema::{FieldSpec, FieldType, Schema};

/// `{name, score > 0, result}`
#[must_use]
pub fn student_schema() -> Schema {
    Schema::new("Student")
        .required("name", FieldType::String)
        .field(FieldSpec::new("score", FieldType::Integer).gt(0))
        .required("result", FieldType::Integer)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub name: String,
    pub score: i64,
    pub result: i64,
}

/// `{name, score, result}` where `result` is filled in by the handler.
#[must_use]
pub fn undergraduate_schema() -> Schema {
    Schema::new("Undergraduate")
        .required("name", FieldType::String)
        .required("score", FieldType::Integer)
        .computed("result")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Undergraduate {
    pub name: String,
    pub score: i64,
    pub result: Option<String>,
}

/// Pass mark for [`Undergraduate::grade`], inclusive.
pub const PASS_MARK: i64 = 50;

impl Undergraduate {
    /// Fill in `result`: "Pass" at or above [`PASS_MARK`], otherwise "Fail".
    pub fn grade(&mut self) {
        let result = if self.score >= PASS_MARK { "Pass" } else { "Fail" };
        self.result = Some(result.to_string());
    }
}

/// `{item_name, price, quantity, total_price}` where `total_price` is computed.
#[must_use]
pub fn order_schema() -> Schema {
    Schema::new("Order")
        .required("item_name", FieldType::String)
        .required("price", FieldType::Integer)
        .required("quantity", FieldType::Integer)
        .computed("total_price")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub item_name: String,
    pub price: i64,
    pub quantity: i64,
    pub total_price: Option<i64>,
}

impl Order {
    pub fn total(&mut self) {
        self.total_price = Some(self.price.saturating_mul(self.quantity));
    }
}

#[must_use]
pub fn profile_schema() -> Schema {
    Schema::new("Profile")
        .required("name", FieldType::String)
        .required("email", FieldType::String)
        .required("age", FieldType::Integer)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub email: String,
    pub age: i64,
}

#[must_use]
pub fn user_schema() -> Schema {
    Schema::new("User")
        .required("name", FieldType::String)
        .required("email", FieldType::String)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    pub email: String,
}

#[must_use]
pub fn image_schema() -> Schema {
    Schema::new("Image")
        .required("url", FieldType::String)
        .required("name", FieldType::String)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub name: String,
}

/// Catalog product.
///
/// `discounted_price` may be sent as an integer or left out; `tags` is a set
/// of strings and `image` a list of [`Image`]s, both empty by default.
#[must_use]
pub fn product_schema() -> Schema {
    Schema::new("Product")
        .required("name", FieldType::String)
        .required("price", FieldType::Integer)
        .required("discount", FieldType::Integer)
        .field(FieldSpec::new("discounted_price", FieldType::Integer).optional())
        .field(
            FieldSpec::new("tags", FieldType::set(FieldType::String))
                .default_value(serde_json::json!([])),
        )
        .field(
            FieldSpec::new("image", FieldType::list(FieldType::object(image_schema())))
                .default_value(serde_json::json!([])),
        )
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub price: i64,
    pub discount: i64,
    #[serde(serialize_with = "whole_as_integer")]
    pub discounted_price: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub image: Vec<Image>,
}

impl Product {
    /// `price - price * discount / 100`, kept fractional when it does not divide evenly.
    pub fn apply_discount(&mut self) {
        let price = self.price as f64;
        self.discounted_price = Some(price - price * self.discount as f64 / 100.0);
    }
}

/// Serialize `17000.0` as `17000`, and `8.5` as is.
fn whole_as_integer<S: Serializer>(value: &Option<f64>, s: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(v) if v.fract() == 0.0 && v.abs() < 9.0e15 => s.serialize_i64(*v as i64),
        Some(v) => s.serialize_f64(*v),
        None => s.serialize_none(),
    }
}

/// `{name, description?, price, products: [Product]}`
#[must_use]
pub fn offer_schema() -> Schema {
    Schema::new("Offer")
        .required("name", FieldType::String)
        .field(FieldSpec::new("description", FieldType::String).optional())
        .required("price", FieldType::Number)
        .required("products", FieldType::list(FieldType::object(product_schema())))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub name: String,
    pub description: Option<String>,
    pub price: Number,
    pub products: Vec<Product>,
}
