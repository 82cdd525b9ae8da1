//! Typed handlers: requests are deserialized from the bound arguments, and
//! whatever the handler returns is serialized as the JSON response.

use serde::{Deserialize, Serialize};

use super::models::{Offer, Order, Product, Profile, Student, Undergraduate, User};
use crate::dispatcher::HandlerRequest;
use crate::typed::{Handler, TypedHandlerRequest};

/// Implement `TryFrom<HandlerRequest>` by deserializing all bound arguments.
macro_rules! from_bound_args {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryFrom<HandlerRequest> for $ty {
                type Error = anyhow::Error;

                fn try_from(req: HandlerRequest) -> anyhow::Result<Self> {
                    req.args()
                }
            }
        )*
    };
}

#[derive(Debug, Deserialize)]
pub struct UserIdArgs {
    pub id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PageArgs {
    pub page: i64,
    pub limit: i64,
}

#[derive(Debug, Deserialize)]
pub struct StudentArgs {
    pub student: Student,
}

#[derive(Debug, Deserialize)]
pub struct UndergraduateArgs {
    pub undergraduate: Undergraduate,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct OrderArgs {
    pub order_id: i64,
    pub customer: String,
    pub order: Order,
}

#[derive(Debug, Deserialize)]
pub struct ProfileArgs {
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct AddProductArgs {
    pub product_id: i64,
    pub category: String,
    pub product: Product,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PurchaseArgs {
    pub user: User,
    pub product: Product,
}

#[derive(Debug, Deserialize)]
pub struct OfferArgs {
    pub offer: Offer,
}

#[derive(Debug, Deserialize)]
pub struct ProductArgs {
    pub product: Product,
}

from_bound_args!(
    UserIdArgs,
    PageArgs,
    StudentArgs,
    UndergraduateArgs,
    OrderArgs,
    ProfileArgs,
    AddProductArgs,
    PurchaseArgs,
    OfferArgs,
    ProductArgs,
);

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

/// `GET /user/{id:int}`
pub struct UserById;

impl Handler for UserById {
    type Request = UserIdArgs;
    type Response = Message;

    fn handle(&self, req: TypedHandlerRequest<UserIdArgs>) -> Message {
        Message {
            message: format!("user with id {}", req.data.id),
        }
    }
}

/// `GET /items?page=&limit=`
pub struct Pagination;

impl Handler for Pagination {
    type Request = PageArgs;
    type Response = PageArgs;

    fn handle(&self, req: TypedHandlerRequest<PageArgs>) -> PageArgs {
        req.data
    }
}

pub struct EchoStudent;

impl Handler for EchoStudent {
    type Request = StudentArgs;
    type Response = Student;

    fn handle(&self, req: TypedHandlerRequest<StudentArgs>) -> Student {
        req.data.student
    }
}

/// Grades an undergraduate before echoing it back.
pub struct Transcript;

impl Handler for Transcript {
    type Request = UndergraduateArgs;
    type Response = Undergraduate;

    fn handle(&self, req: TypedHandlerRequest<UndergraduateArgs>) -> Undergraduate {
        let mut undergraduate = req.data.undergraduate;
        undergraduate.grade();
        undergraduate
    }
}

/// Fills in `total_price` and echoes the order with its id and customer.
pub struct OrderDetail;

impl Handler for OrderDetail {
    type Request = OrderArgs;
    type Response = OrderArgs;

    fn handle(&self, req: TypedHandlerRequest<OrderArgs>) -> OrderArgs {
        let mut receipt = req.data;
        receipt.order.total();
        receipt
    }
}

pub struct AddUser;

impl Handler for AddUser {
    type Request = ProfileArgs;
    type Response = Profile;

    fn handle(&self, req: TypedHandlerRequest<ProfileArgs>) -> Profile {
        req.data.profile
    }
}

#[derive(Debug, Serialize)]
pub struct ProductReceipt {
    #[serde(rename = "Product_Id")]
    pub product_id: i64,
    #[serde(rename = "Product")]
    pub product: Product,
    pub category: String,
}

/// Applies the discount and echoes the product with its id and category.
pub struct AddProduct;

impl Handler for AddProduct {
    type Request = AddProductArgs;
    type Response = ProductReceipt;

    fn handle(&self, req: TypedHandlerRequest<AddProductArgs>) -> ProductReceipt {
        let AddProductArgs {
            product_id,
            category,
            mut product,
        } = req.data;
        product.apply_discount();
        ProductReceipt {
            product_id,
            product,
            category,
        }
    }
}

pub struct Purchase;

impl Handler for Purchase {
    type Request = PurchaseArgs;
    type Response = PurchaseArgs;

    fn handle(&self, req: TypedHandlerRequest<PurchaseArgs>) -> PurchaseArgs {
        req.data
    }
}

pub struct MakeOffer;

impl Handler for MakeOffer {
    type Request = OfferArgs;
    type Response = Offer;

    fn handle(&self, req: TypedHandlerRequest<OfferArgs>) -> Offer {
        req.data.offer
    }
}

/// `POST /addproduct/`: catalog entry echoed unchanged.
pub struct AddCatalogProduct;

impl Handler for AddCatalogProduct {
    type Request = ProductArgs;
    type Response = Product;

    fn handle(&self, req: TypedHandlerRequest<ProductArgs>) -> Product {
        req.data.product
    }
}
