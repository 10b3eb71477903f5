// Versions command for listing the selectable versions of one product

use super::Context;
use crate::error::CcdlError;
use crate::resolver;
use crate::ui;

pub async fn versions(ctx: &Context, code: &str) -> anyhow::Result<i32> {
    let catalog = ctx.load_catalog().await?;
    let product = catalog
        .product(code)
        .ok_or_else(|| CcdlError::NotFound(format!("product '{}'", code)))?;

    let versions = resolver::selectable_versions(product, &ctx.allowed_platforms());
    if versions.is_empty() {
        return Err(CcdlError::NotFound(format!(
            "downloadable version of '{}' for {}",
            product.code, ctx.arch
        ))
        .into());
    }

    ui::header(&format!("{} ({})", product.display_name, product.code));
    for v in versions {
        let base = if v.base_version != v.product_version {
            format!(" [base {}]", v.base_version)
        } else {
            String::new()
        };
        ui::status(&v.product_version, &format!("{}{}", v.platform, base));
    }
    Ok(0)
}
