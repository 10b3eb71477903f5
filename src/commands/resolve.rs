// Resolve command for showing the build set a download would fetch

use super::Context;
use crate::resolver;
use crate::ui;

pub async fn resolve(ctx: &Context, code: &str, version: Option<&str>) -> anyhow::Result<i32> {
    let catalog = ctx.load_catalog().await?;
    let allowed = ctx.allowed_platforms();
    let record = resolver::select_version(&catalog, code, version, &allowed)?;
    let set = resolver::resolve_download_set(&catalog, record, &allowed)?;

    ui::header(&format!(
        "{} {} resolves to {} product(s):",
        record.product_code,
        record.product_version,
        set.len()
    ));
    for dep in &set {
        ui::status(
            &format!("{}_{}", dep.product_code, dep.product_version),
            &format!("{} {}", dep.platform, dep.build_guid),
        );
    }
    Ok(0)
}
