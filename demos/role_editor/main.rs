//! Role editor walkthrough: pick privileges, save the diff, then serve the API
//!
//! Run with `RUST_LOG=debug cargo run --example role_editor` to see the
//! association protocol at work; pass `--serve` to keep the REST API up.

use console::prelude::*;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}

fn privilege(name: &str, description: &str) -> Privilege {
    Privilege::new(name.to_string(), Some(description.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    println!("🚀 Admin Console role editor\n");

    let config = ConsoleConfig::default_config();

    let privileges = Arc::new(InMemoryRecordService::with_records(vec![
        privilege("USER_READ", "Browse users"),
        privilege("USER_WRITE", "Create and edit users"),
        privilege("ROLE_READ", "Browse roles"),
        privilege("ROLE_WRITE", "Create and edit roles"),
        privilege("AUDIT_READ", "Read the audit trail"),
    ]));
    let roles = Arc::new(InMemoryRecordService::<Role>::new());

    // === Create a role with two privileges ===
    let mut screen = EditController::<Role, _>::new_record(
        roles.clone(),
        config.validation_for("role"),
        RoleAssociations::default(),
        Role::new("Support".to_string(), Some("First-line support".to_string())),
    );

    let criteria = SearchCriteria::default()
        .with_where(WhereClause::like("name", "%_READ"))
        .with_sort(SortClause::asc("name"))
        .with_total(true);
    println!("🔎 Candidate query: {:?}\n", criteria.to_wire_params().into_inner());

    let pool = &mut screen.associations_mut()?.privileges;
    let meta = load_candidates(pool, privileges.as_ref(), &criteria).await?;
    println!("📋 {} READ privileges available", meta.total.unwrap_or_default());

    let keys: Vec<Uuid> = pool.pool().keys().copied().collect();
    for key in keys.iter().take(2) {
        pool.toggle_candidate(key);
    }
    println!("✅ Pending: {:?}\n", pool.pending_counts());

    screen.save().await?;
    let role_id = screen
        .record()
        .id
        .ok_or_else(|| anyhow::anyhow!("saved role has no id"))?;
    println!("💾 Saved role {role_id}");

    // === Reopen it, swap a privilege ===
    let mut screen = EditController::<Role, _>::open(
        roles.clone(),
        config.validation_for("role"),
        RoleAssociations::default(),
        role_id,
    )
    .await?;
    screen.edit()?;

    let pool = &mut screen.associations_mut()?.privileges;
    load_candidates(pool, privileges.as_ref(), &criteria).await?;
    if let (Some(first), Some(last)) = (keys.first(), keys.last()) {
        pool.toggle_candidate(first);
        pool.toggle_candidate(last);
    }
    for record in pool.snapshot() {
        println!("   {:<12} {}", record.edit_action.to_string(), record.target.name);
    }

    screen.save().await?;
    let names: Vec<&str> = screen
        .record()
        .privileges
        .iter()
        .map(|record| record.target.name.as_str())
        .collect();
    println!("💾 Settled privileges: {names:?}\n");

    // === Layout preference ===
    let layout = Layout::new(Arc::new(InMemoryPreferences::new()));
    println!("📐 Sidenav open: {}", layout.toggle_sidenav()?);

    if std::env::args().any(|arg| arg == "--serve") {
        ServerBuilder::new()
            .with_config(config)
            .register::<Privilege>(privileges)
            .register::<Role>(roles)
            .serve("127.0.0.1:3000")
            .await?;
    }

    Ok(())
}
