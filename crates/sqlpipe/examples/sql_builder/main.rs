//! Building statements for several dialects from one set of calls.
//!
//! Run with: cargo run --example sql_builder -p sqlpipe
//!
//! Set RUST_LOG=sqlpipe=debug to see the rendered-statement events.

use sqlpipe::{
    Aliasable, ColumnDef, Dialect, DialectKind, Direction, Feature, LockMode, SqlConfig, SqlError,
    SqlFactory, StatementBuilder, Value, condition, count, in_list, on,
};

fn main() -> Result<(), SqlError> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("sqlpipe=debug".parse().expect("valid directive")),
        )
        .init();

    for kind in [DialectKind::MySql, DialectKind::Postgres, DialectKind::Sqlite] {
        let sql = SqlFactory::from_config(SqlConfig::new().dialect(kind));
        println!("=== {} ===", sql.dialect().name());

        // ============================================
        // CREATE TABLE
        // ============================================
        let mut create = sql.create_table();
        create
            .if_not_exists()
            .table("orders")?
            .column(ColumnDef::new("id", "INTEGER").not_null().primary_key())?
            .column(ColumnDef::new("user_id", "INTEGER").not_null())?
            .column(ColumnDef::new("status", "VARCHAR(16)").default_value("new"))?
            .foreign_key(["user_id"], "users", ["id"])?;
        println!("{}", create.build()?.sql);

        // ============================================
        // INSERT
        // ============================================
        let mut insert = sql.insert();
        insert
            .into_table("orders")?
            .columns(["id", "user_id", "status"])?
            .values([Value::from(1), Value::from(10), Value::from("paid")])?
            .values([Value::from(2), Value::from(11), Value::Null])?;
        println!("{}", insert.build()?.sql);

        // ============================================
        // SELECT with join, grouping and paging
        // ============================================
        let mut report = sql.select();
        report
            .select([Aliasable::from("u.name"), ("orders", count("o.id")).into()])?
            .from([("u", "users")])?
            .left_join(("o", "orders"), [on("o.user_id", "u.id")])?
            .and_where([in_list("o.status", ["paid", "shipped"])?])?
            .group_by(["u.name"])?
            .and_having([condition(count("o.id"), ">", 1)?])?
            .order_by_desc("orders")?
            .paginate(2, 25)?;
        if sql.dialect().supports(Feature::RowLocking) {
            report.lock(LockMode::ForShare);
        }
        println!("{}", report.build()?.sql);

        // ============================================
        // UPDATE / DELETE
        // ============================================
        let mut update = sql.update();
        update
            .table("orders")?
            .set("status", "shipped")?
            .and_where([condition("id", "=", 1)?])?;
        println!("{}", update.build()?.sql);

        let mut delete = sql.delete();
        delete
            .from("orders")?
            .and_where([condition("status", "IS", None::<String>)?])?;
        if kind == DialectKind::MySql {
            delete.order_by("id", Direction::Asc)?.limit(100);
        }
        println!("{}", delete.build()?.sql);
        println!();
    }

    Ok(())
}
