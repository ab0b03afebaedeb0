// src/models/averbacao.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClienteResumo {
    #[schema(example = "Transportes Atlântico Ltda")]
    pub nome: String,
    #[serde(default)]
    #[schema(example = "12.345.678/0001-99")]
    pub cnpj: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SeguradoraResumo {
    #[schema(example = "Seguradora Porto Seguro")]
    pub nome: String,
    #[serde(default)]
    pub apolice: Option<String>,
}

// Um container coberto pela averbação. Valores ausentes somam como zero no relatório.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Container {
    pub id: Uuid,
    #[schema(example = "MSCU1234567")]
    pub numero: String,
    #[serde(default)]
    #[schema(example = "40HC")]
    pub tipo: Option<String>,
    #[serde(default)]
    #[schema(example = "APROVADO")]
    pub status: Option<String>,
    #[serde(default)]
    #[schema(example = "100000.00")]
    pub valor_mercadoria: Option<Decimal>,
    #[serde(default)]
    #[schema(example = "350.50")]
    pub premio: Option<Decimal>,
    #[serde(default)]
    pub peso_kg: Option<Decimal>,
    #[serde(default)]
    pub descricao: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Averbacao {
    pub id: Uuid,
    #[schema(example = "AVB-2024-0042")]
    pub numero: String,
    #[serde(default)]
    #[schema(example = "APROVADO")]
    pub status: Option<String>,
    #[serde(default)]
    pub cliente: Option<ClienteResumo>,
    #[serde(default)]
    pub seguradora: Option<SeguradoraResumo>,
    #[serde(default)]
    pub data_inicio: Option<NaiveDate>,
    #[serde(default)]
    pub data_fim: Option<NaiveDate>,
    #[serde(default)]
    #[schema(example = "Santos/SP")]
    pub origem: Option<String>,
    #[serde(default)]
    #[schema(example = "Rotterdam/NL")]
    pub destino: Option<String>,
    #[serde(default)]
    pub navio: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub containers: Vec<Container>,
}
