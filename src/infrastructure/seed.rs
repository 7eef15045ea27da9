use crate::entities::{prelude::*, *};
use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::env;
use tracing::info;
use uuid::Uuid;

pub async fn seed_catalog(db: &DatabaseConnection) -> anyhow::Result<()> {
    info!("🌱 Seeding catalog data...");

    let category_seed: &[(&str, &str, &[(&str, &str)])] = &[
        (
            "Chairs",
            "chairs",
            &[
                ("Bar stools", "bar-chairs"),
                ("Dining chairs", "dining-chairs"),
            ],
        ),
        ("Sofas and armchairs", "sofas", &[]),
        ("Beds", "beds", &[]),
        ("Ottomans and poufs", "ottomans", &[]),
        ("Tables", "tables", &[]),
    ];

    for (name, slug, subs) in category_seed {
        let existing = Categories::find()
            .filter(categories::Column::Slug.eq(*slug))
            .one(db)
            .await?;

        let category_id = match existing {
            Some(category) => category.id,
            None => {
                let model = categories::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    name: Set((*name).to_string()),
                    slug: Set((*slug).to_string()),
                    description: Set(None),
                };
                model.insert(db).await?.id
            }
        };

        for (sub_name, sub_slug) in *subs {
            let exists = SubCategories::find()
                .filter(sub_categories::Column::Slug.eq(*sub_slug))
                .one(db)
                .await?;

            if exists.is_none() {
                let model = sub_categories::ActiveModel {
                    id: Set(Uuid::new_v4().to_string()),
                    name: Set((*sub_name).to_string()),
                    slug: Set((*sub_slug).to_string()),
                    description: Set(None),
                    category_id: Set(category_id.clone()),
                };
                model.insert(db).await?;
            }
        }
    }

    let admin_email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());

    let exists = Users::find()
        .filter(users::Column::Email.eq(&admin_email))
        .one(db)
        .await?;

    if exists.is_none() {
        let admin_password = env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(admin_password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();

        let admin = users::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            email: Set(admin_email.clone()),
            name: Set(None),
            password_hash: Set(password_hash),
            role: Set("ADMIN".to_string()),
            created_at: Set(Some(Utc::now())),
        };
        admin.insert(db).await?;

        info!("👤 Admin user '{}' created", admin_email);
    }

    info!("✅ Seeding completed.");
    Ok(())
}
