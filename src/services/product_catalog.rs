use crate::{
    config::AppConfig,
    db::DbPool,
    entities::{
        product::{self, Entity as Product},
        sub_variant::{self, Entity as SubVariant, OptionIds},
        variant::{self, Entity as Variant},
        variant_option::{self, Entity as VariantOption},
    },
    errors::ServiceError,
    quantity::Quantity,
    services::PageWindow,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseTransaction, EntityTrait, LoaderTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

/// Input for creating a product with its variant taxonomy
#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct CreateProductInput {
    /// External numeric product code
    #[validate(range(min = 1, message = "product_id must be positive"))]
    pub product_id: i64,
    #[validate(length(min = 1, max = 100, message = "product_code must be 1-100 characters"))]
    pub product_code: String,
    #[validate(length(min = 1, max = 255, message = "product_name must be 1-255 characters"))]
    pub product_name: String,
    #[serde(default)]
    pub product_image: Option<String>,
    /// Id of the creating user
    pub created_user: String,
    #[serde(default)]
    pub is_favourite: bool,
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    #[validate(length(max = 32, message = "hsn_code must be at most 32 characters"))]
    pub hsn_code: String,
    #[serde(default)]
    #[validate]
    pub variants: Vec<VariantInput>,
    #[serde(default)]
    #[validate]
    pub sub_variants: Vec<SubVariantInput>,
}

fn default_active() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct VariantInput {
    #[validate(length(min = 1, max = 100, message = "variant name must be 1-100 characters"))]
    pub name: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, Validate, ToSchema)]
pub struct SubVariantInput {
    #[validate(length(min = 1, max = 100, message = "sku must be 1-100 characters"))]
    pub sku: String,
    #[serde(default)]
    pub option_values: Vec<OptionValueInput>,
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct OptionValueInput {
    pub variant_name: String,
    pub value: String,
}

/// A variant together with its options
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct VariantDetail {
    #[serde(flatten)]
    pub variant: variant::Model,
    pub options: Vec<variant_option::Model>,
}

/// A product with its whole taxonomy
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub product: product::Model,
    pub variants: Vec<VariantDetail>,
    pub sub_variants: Vec<sub_variant::Model>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductPage {
    pub items: Vec<ProductDetail>,
    pub total: u64,
    pub page: u64,
    pub limit: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionRef {
    pub variant_id: Uuid,
    pub option_id: Uuid,
}

#[derive(Debug, Clone)]
pub struct PlannedVariant {
    pub id: Uuid,
    pub name: String,
    pub options: Vec<(Uuid, String)>,
}

#[derive(Debug, Clone)]
pub struct PlannedSubVariant {
    pub id: Uuid,
    pub sku: String,
    pub option_ids: Vec<Uuid>,
}

/// Typed `(variant name, option value) -> option` mapping with the ids every
/// row will be inserted under.
#[derive(Debug, Clone, Default)]
pub struct OptionIndex {
    variants: Vec<PlannedVariant>,
    by_name: HashMap<(String, String), OptionRef>,
}

impl OptionIndex {
    /// Assigns ids to every variant and option, rejecting blank or duplicated
    /// names and variants without options.
    pub fn build(inputs: &[VariantInput]) -> Result<Self, ServiceError> {
        let mut index = OptionIndex::default();
        let mut seen_variants = HashSet::new();

        for input in inputs {
            let name = input.name.trim();
            if name.is_empty() {
                return Err(ServiceError::ValidationError(
                    "variant name must not be blank".into(),
                ));
            }
            if !seen_variants.insert(name.to_string()) {
                return Err(ServiceError::ValidationError(format!(
                    "variant '{}' is listed more than once",
                    name
                )));
            }
            if input.options.is_empty() {
                return Err(ServiceError::ValidationError(format!(
                    "variant '{}' must have at least one option",
                    name
                )));
            }

            let variant_id = Uuid::new_v4();
            let mut options = Vec::with_capacity(input.options.len());
            for raw in &input.options {
                let value = raw.trim();
                if value.is_empty() {
                    return Err(ServiceError::ValidationError(format!(
                        "variant '{}' has a blank option",
                        name
                    )));
                }
                let option_id = Uuid::new_v4();
                let key = (name.to_string(), value.to_string());
                if index.by_name.contains_key(&key) {
                    return Err(ServiceError::ValidationError(format!(
                        "variant '{}' lists option '{}' more than once",
                        name, value
                    )));
                }
                index.by_name.insert(
                    key,
                    OptionRef {
                        variant_id,
                        option_id,
                    },
                );
                options.push((option_id, value.to_string()));
            }

            index.variants.push(PlannedVariant {
                id: variant_id,
                name: name.to_string(),
                options,
            });
        }

        Ok(index)
    }

    pub fn resolve(&self, variant_name: &str, value: &str) -> Option<OptionRef> {
        self.by_name
            .get(&(variant_name.trim().to_string(), value.trim().to_string()))
            .copied()
    }

    pub fn variants(&self) -> &[PlannedVariant] {
        &self.variants
    }
}

/// Every row a product creation will insert, validated up front.
#[derive(Debug, Clone)]
pub struct CatalogPlan {
    pub index: OptionIndex,
    pub sub_variants: Vec<PlannedSubVariant>,
}

impl CatalogPlan {
    pub fn build(
        variants: &[VariantInput],
        sub_variants: &[SubVariantInput],
    ) -> Result<Self, ServiceError> {
        let index = OptionIndex::build(variants)?;
        let mut skus = HashSet::new();
        let mut combinations: HashSet<BTreeSet<Uuid>> = HashSet::new();
        let mut planned = Vec::with_capacity(sub_variants.len());

        for input in sub_variants {
            let sku = input.sku.trim();
            if sku.is_empty() {
                return Err(ServiceError::ValidationError("sku must not be blank".into()));
            }
            if !skus.insert(sku.to_string()) {
                return Err(ServiceError::ValidationError(format!(
                    "sku '{}' is listed more than once",
                    sku
                )));
            }

            let mut axes = HashSet::new();
            let mut option_ids = Vec::with_capacity(input.option_values.len());
            for choice in &input.option_values {
                let option = index
                    .resolve(&choice.variant_name, &choice.value)
                    .ok_or_else(|| {
                        ServiceError::ValidationError(format!(
                            "sub-variant '{}' references unknown option '{}' of variant '{}'",
                            sku,
                            choice.value.trim(),
                            choice.variant_name.trim()
                        ))
                    })?;
                if !axes.insert(option.variant_id) {
                    return Err(ServiceError::ValidationError(format!(
                        "sub-variant '{}' names variant '{}' more than once",
                        sku,
                        choice.variant_name.trim()
                    )));
                }
                option_ids.push(option.option_id);
            }

            if !combinations.insert(option_ids.iter().copied().collect()) {
                return Err(ServiceError::ValidationError(format!(
                    "sub-variant '{}' repeats an option combination",
                    sku
                )));
            }

            planned.push(PlannedSubVariant {
                id: Uuid::new_v4(),
                sku: sku.to_string(),
                option_ids,
            });
        }

        Ok(Self {
            index,
            sub_variants: planned,
        })
    }
}

/// Product catalog service: creation and read access
#[derive(Clone)]
pub struct ProductCatalogService {
    db: Arc<DbPool>,
    default_limit: u64,
    max_limit: u64,
}

impl ProductCatalogService {
    pub fn new(db: Arc<DbPool>, default_limit: u64, max_limit: u64) -> Self {
        Self {
            db,
            default_limit,
            max_limit,
        }
    }

    pub fn from_config(db: Arc<DbPool>, config: &AppConfig) -> Self {
        Self::new(db, config.product_default_limit, config.product_max_limit)
    }

    /// Create a product and its whole variant taxonomy in one transaction
    #[instrument(skip(self, input), fields(product_code = %input.product_code))]
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<ProductDetail, ServiceError> {
        input.validate()?;
        let created_user = Uuid::parse_str(input.created_user.trim()).map_err(|_| {
            ServiceError::InvalidReference(format!(
                "created_user '{}' is not a valid id",
                input.created_user
            ))
        })?;
        let plan = CatalogPlan::build(&input.variants, &input.sub_variants)?;
        let product_id = Uuid::new_v4();

        let db = self.db.as_ref();
        db.transaction::<_, (), ServiceError>(move |txn| {
            Box::pin(async move {
                ensure_unique(txn, &input, &plan).await?;
                insert_plan(txn, product_id, created_user, &input, &plan).await
            })
        })
        .await
        .map_err(|e| match e {
            TransactionError::Connection(db_err) => ServiceError::from_db(db_err),
            TransactionError::Transaction(service_err) => service_err,
        })?;

        info!(product_id = %product_id, "Created product");
        self.get_product(product_id).await
    }

    /// List products oldest first, each with its taxonomy
    #[instrument(skip(self))]
    pub async fn list_products(
        &self,
        page: Option<i64>,
        limit: Option<i64>,
    ) -> Result<ProductPage, ServiceError> {
        let paging = PageWindow::normalize(page, limit, self.default_limit, self.max_limit);
        let db = self.db.as_ref();

        let total = Product::find()
            .count(db)
            .await
            .map_err(ServiceError::from_db)?;
        let products = Product::find()
            .order_by_asc(product::Column::CreatedDate)
            .order_by_asc(product::Column::Id)
            .limit(paging.limit)
            .offset(paging.offset())
            .all(db)
            .await
            .map_err(ServiceError::from_db)?;

        Ok(ProductPage {
            items: self.load_details(products).await?,
            total,
            page: paging.page,
            limit: paging.limit,
        })
    }

    /// Get one product with its taxonomy
    #[instrument(skip(self))]
    pub async fn get_product(&self, id: Uuid) -> Result<ProductDetail, ServiceError> {
        let product = Product::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(ServiceError::from_db)?
            .ok_or_else(|| ServiceError::NotFound(format!("product {}", id)))?;

        self.load_details(vec![product])
            .await?
            .pop()
            .ok_or_else(|| ServiceError::InternalError(format!("product {} vanished", id)))
    }

    async fn load_details(
        &self,
        products: Vec<product::Model>,
    ) -> Result<Vec<ProductDetail>, ServiceError> {
        let db = self.db.as_ref();

        let variants = products
            .load_many(Variant, db)
            .await
            .map_err(ServiceError::from_db)?;
        let sub_variants = products
            .load_many(SubVariant, db)
            .await
            .map_err(ServiceError::from_db)?;

        let all_variants: Vec<variant::Model> = variants.iter().flatten().cloned().collect();
        let options = all_variants
            .load_many(VariantOption, db)
            .await
            .map_err(ServiceError::from_db)?;
        let mut options_by_variant: HashMap<Uuid, Vec<variant_option::Model>> = all_variants
            .iter()
            .map(|v| v.id)
            .zip(options)
            .collect();

        Ok(products
            .into_iter()
            .zip(variants)
            .zip(sub_variants)
            .map(|((product, mut variants), mut sub_variants)| {
                variants.sort_by_key(|v| v.position);
                sub_variants.sort_by(|a, b| a.sku.cmp(&b.sku));
                let variants = variants
                    .into_iter()
                    .map(|variant| {
                        let mut options = options_by_variant.remove(&variant.id).unwrap_or_default();
                        options.sort_by_key(|o| o.position);
                        VariantDetail { variant, options }
                    })
                    .collect();
                ProductDetail {
                    product,
                    variants,
                    sub_variants,
                }
            })
            .collect())
    }
}

async fn ensure_unique(
    txn: &DatabaseTransaction,
    input: &CreateProductInput,
    plan: &CatalogPlan,
) -> Result<(), ServiceError> {
    let code = input.product_code.trim();
    let clash = Product::find()
        .filter(
            product::Column::ProductCode
                .eq(code)
                .or(product::Column::ProductNumber.eq(input.product_id)),
        )
        .one(txn)
        .await
        .map_err(ServiceError::from_db)?;
    if let Some(existing) = clash {
        warn!(existing = %existing.id, "Rejected product with duplicate identity");
        return Err(if existing.product_code == code {
            ServiceError::Conflict(format!("product code '{}' already exists", code))
        } else {
            ServiceError::Conflict(format!("product id {} already exists", input.product_id))
        });
    }

    if plan.sub_variants.is_empty() {
        return Ok(());
    }
    let skus: Vec<&str> = plan.sub_variants.iter().map(|s| s.sku.as_str()).collect();
    if let Some(existing) = SubVariant::find()
        .filter(sub_variant::Column::Sku.is_in(skus))
        .one(txn)
        .await
        .map_err(ServiceError::from_db)?
    {
        warn!(sku = %existing.sku, "Rejected product with duplicate sku");
        return Err(ServiceError::Conflict(format!(
            "sku '{}' already exists",
            existing.sku
        )));
    }

    Ok(())
}

async fn insert_plan(
    txn: &DatabaseTransaction,
    product_id: Uuid,
    created_user: Uuid,
    input: &CreateProductInput,
    plan: &CatalogPlan,
) -> Result<(), ServiceError> {
    let now = Utc::now();

    product::ActiveModel {
        id: Set(product_id),
        product_number: Set(input.product_id),
        product_code: Set(input.product_code.trim().to_string()),
        product_name: Set(input.product_name.trim().to_string()),
        product_image: Set(input
            .product_image
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)),
        created_user: Set(created_user),
        is_favourite: Set(input.is_favourite),
        active: Set(input.active),
        hsn_code: Set(input.hsn_code.trim().to_string()),
        total_stock: Set(Quantity::ZERO),
        created_date: Set(now),
        updated_date: Set(now),
    }
    .insert(txn)
    .await
    .map_err(ServiceError::from_db)?;

    for (position, planned) in plan.index.variants().iter().enumerate() {
        variant::ActiveModel {
            id: Set(planned.id),
            product_id: Set(product_id),
            name: Set(planned.name.clone()),
            position: Set(position as i32),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::from_db)?;

        for (option_position, (option_id, value)) in planned.options.iter().enumerate() {
            variant_option::ActiveModel {
                id: Set(*option_id),
                variant_id: Set(planned.id),
                value: Set(value.clone()),
                position: Set(option_position as i32),
            }
            .insert(txn)
            .await
            .map_err(ServiceError::from_db)?;
        }
    }

    for planned in &plan.sub_variants {
        sub_variant::ActiveModel {
            id: Set(planned.id),
            product_id: Set(product_id),
            sku: Set(planned.sku.clone()),
            option_ids: Set(OptionIds(planned.option_ids.clone())),
            stock: Set(Quantity::ZERO),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await
        .map_err(ServiceError::from_db)?;
    }

    Ok(())
}
