//! # Seed Data Generator
//!
//! Populates the database with development data: categories, products,
//! clients and suppliers.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p gestio-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p gestio-db --bin seed -- --count 2000
//!
//! # Specify database path
//! cargo run -p gestio-db --bin seed -- --db ./data/gestio.db
//! ```
//!
//! ## Generated Data
//! - Categories: a fixed set of retail categories
//! - Products: unique code `{CAT}-{NNN}`, price spread, random-ish stock
//!   and reorder thresholds (deterministic from the index)
//! - Clients/suppliers: small fixed sets with contact details

use chrono::Utc;
use std::env;
use uuid::Uuid;

use gestio_core::{Category, Contact, EntityStatus, Product};
use gestio_db::{Database, DbConfig};

/// Categories with product name stems for realistic test data.
const CATEGORIES: &[(&str, &str, &[&str])] = &[
    (
        "BEB",
        "Bebidas",
        &[
            "Água das Pedras 25cl",
            "Água Luso 1,5L",
            "Sumo de Laranja 1L",
            "Sumo de Maçã 1L",
            "Refrigerante Cola 33cl",
            "Refrigerante Limão 33cl",
            "Cerveja Lager 33cl",
            "Vinho Tinto Reserva",
            "Vinho Branco Verde",
            "Café Torrado em Grão 1kg",
        ],
    ),
    (
        "MER",
        "Mercearia",
        &[
            "Arroz Carolino 1kg",
            "Massa Esparguete 500g",
            "Feijão Manteiga 500g",
            "Grão de Bico 500g",
            "Atum em Azeite 120g",
            "Azeite Virgem Extra 75cl",
            "Farinha de Trigo 1kg",
            "Açúcar Branco 1kg",
            "Sal Marinho 1kg",
            "Bolacha Maria 200g",
        ],
    ),
    (
        "LAC",
        "Laticínios",
        &[
            "Leite Meio-Gordo 1L",
            "Iogurte Natural 4x120g",
            "Queijo Flamengo Fatiado",
            "Queijo Fresco 200g",
            "Manteiga com Sal 250g",
            "Natas para Culinária 200ml",
            "Requeijão 150g",
            "Leite de Aveia 1L",
        ],
    ),
    (
        "LIM",
        "Limpeza",
        &[
            "Detergente Loiça 1L",
            "Detergente Roupa 2L",
            "Lixívia Tradicional 2L",
            "Limpa Vidros 500ml",
            "Esfregão Aço Inox",
            "Sacos do Lixo 30L",
            "Papel Higiénico 12 Rolos",
            "Rolo de Cozinha 4 Rolos",
        ],
    ),
];

const CLIENTS: &[(&str, &str)] = &[
    ("Mercearia Silva", "geral@merceariasilva.pt"),
    ("Restaurante O Forno", "encomendas@oforno.pt"),
    ("Café Central", "cafecentral@mail.pt"),
    ("Minimercado Rosa", "mrosa@mail.pt"),
    ("Cantina Escolar de Aveiro", "cantina@aveiro.edu.pt"),
];

const SUPPLIERS: &[(&str, &str)] = &[
    ("Distribuidora Norte, Lda", "vendas@distnorte.pt"),
    ("Armazéns do Centro", "comercial@armazenscentro.pt"),
    ("Importadora Atlântico", "atlantico@mail.pt"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // Parse command line arguments
    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut db_path = String::from("./gestio_dev.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Usage: seed [--count N] [--db PATH]");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Seeding {} products into {}", count, db_path);

    let db = Database::new(DbConfig::new(&db_path)).await?;

    // Categories first (products reference them by name)
    for (_, name, _) in CATEGORIES {
        let now = Utc::now();
        let category = Category {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: None,
            status: EntityStatus::Active,
            product_count: 0,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        match db.categories().insert(&category).await {
            Ok(_) => println!("  Category: {}", name),
            Err(gestio_db::DbError::UniqueViolation { .. }) => {
                println!("  Category: {} (already present)", name)
            }
            Err(e) => return Err(e.into()),
        }
    }

    // Products, spread across the categories
    let mut inserted = 0usize;
    for seed in 0..count {
        let (code_prefix, category_name, names) = CATEGORIES[seed % CATEGORIES.len()];
        let base_name = names[(seed / CATEGORIES.len()) % names.len()];

        let product = generate_product(code_prefix, category_name, base_name, seed);

        match db.products().insert(&product).await {
            Ok(_) => inserted += 1,
            Err(gestio_db::DbError::UniqueViolation { .. }) => {}
            Err(e) => return Err(e.into()),
        }

        if inserted > 0 && inserted % 100 == 0 {
            println!("  {} products...", inserted);
        }
    }
    println!("  {} products inserted", inserted);

    for (name, email) in CLIENTS {
        db.clients().insert(&generate_contact(name, email)).await?;
    }
    println!("  {} clients inserted", CLIENTS.len());

    for (name, email) in SUPPLIERS {
        db.suppliers().insert(&generate_contact(name, email)).await?;
    }
    println!("  {} suppliers inserted", SUPPLIERS.len());

    // Sanity checks
    let hits = db.products().search("Água", 10).await?;
    println!("  Search 'Água': {} results", hits.len());

    let low = db.products().list_low_stock().await?;
    println!("  Low stock products: {}", low.len());

    println!();
    println!("✓ Seed complete!");

    Ok(())
}

/// Generates a single product with data derived from the seed index.
fn generate_product(code_prefix: &str, category_name: &str, base_name: &str, seed: usize) -> Product {
    let now = Utc::now();

    // Unique code: BEB-007
    let code = format!("{}-{:03}", code_prefix, seed);

    // Purchase 0.30 - 8.29, sale with a 35-55% markup
    let purchase_price_cents = 30 + ((seed * 17) % 800) as i64;
    let markup_pct = 135 + (seed % 20) as i64;
    let sale_price_cents = purchase_price_cents * markup_pct / 100;

    // Stock 0-60, reorder threshold 0-12
    let current_stock = (seed % 61) as i64;
    let min_stock = (seed % 13) as i64;

    Product {
        id: Uuid::new_v4().to_string(),
        code,
        name: base_name.to_string(),
        description: None,
        category_name: Some(category_name.to_string()),
        purchase_price_cents,
        sale_price_cents,
        current_stock,
        min_stock,
        status: EntityStatus::Active,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}

/// Generates a client/supplier contact.
fn generate_contact(name: &str, email: &str) -> Contact {
    let now = Utc::now();

    Contact {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        email: Some(email.to_string()),
        phone: None,
        address: None,
        tax_id: None,
        notes: None,
        status: EntityStatus::Active,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    }
}
