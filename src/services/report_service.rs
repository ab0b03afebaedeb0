// src/services/report_service.rs

use chrono::{DateTime, Utc};
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use rust_decimal::Decimal;
use std::{collections::BTreeMap, path::PathBuf, sync::Arc};
use uuid::Uuid;

use crate::{
    backend::BackendApi,
    common::{
        error::AppError,
        format::{format_brl, format_number, format_opt_date, or_zero, text_or_dash, MISSING},
    },
    models::{
        auth::Session,
        averbacao::{Averbacao, Container},
    },
};

/// Bucket de quem não tem status.
pub const NO_STATUS: &str = "SEM STATUS";
pub const DEFAULT_ROWS_PER_PAGE: usize = 25;

const TABLE_HEADER: [&str; 7] = ["#", "Container", "Tipo", "Status", "Peso (kg)", "Valor mercadoria", "Prêmio"];
const TABLE_WEIGHTS: [usize; 7] = [1, 3, 2, 2, 2, 3, 3];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketTotals {
    pub count: usize,
    pub valor_mercadoria: Decimal,
    pub premio: Decimal,
}

impl BucketTotals {
    fn add(&mut self, container: &Container) {
        self.count += 1;
        self.valor_mercadoria += or_zero(container.valor_mercadoria);
        self.premio += or_zero(container.premio);
    }
}

/// Totais consolidados de uma averbação.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub overall: BucketTotals,
    pub by_status: BTreeMap<String, BucketTotals>,
}

impl ReportTotals {
    pub fn compute(containers: &[Container]) -> Self {
        let mut totals = Self::default();
        for container in containers {
            totals.overall.add(container);
            totals.by_status.entry(status_key(container)).or_default().add(container);
        }
        totals
    }
}

fn status_key(container: &Container) -> String {
    match container.status.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => NO_STATUS.to_string(),
    }
}

/// Documento já montado, sem nenhuma dependência de fonte ou PDF.
#[derive(Debug, Clone)]
pub struct ReportLayout {
    pub title: String,
    pub generated_at: String,
    pub header: Vec<(String, String)>,
    pub totals: ReportTotals,
    pub pages: Vec<Vec<[String; 7]>>,
    pub qr_payload: String,
    pub file_name: String,
}

impl ReportLayout {
    pub fn build(averbacao: &Averbacao, generated_at: DateTime<Utc>, rows_per_page: usize) -> Self {
        let periodo = match (averbacao.data_inicio, averbacao.data_fim) {
            (None, None) => MISSING.to_string(),
            (inicio, fim) => format!("{} a {}", format_opt_date(inicio), format_opt_date(fim)),
        };
        let cliente = averbacao.cliente.as_ref();
        let seguradora = averbacao.seguradora.as_ref();

        let header = vec![
            ("Número".to_string(), averbacao.numero.clone()),
            ("Status".to_string(), text_or_dash(averbacao.status.as_deref())),
            ("Cliente".to_string(), text_or_dash(cliente.map(|c| c.nome.as_str()))),
            ("CNPJ".to_string(), text_or_dash(cliente.and_then(|c| c.cnpj.as_deref()))),
            ("Seguradora".to_string(), text_or_dash(seguradora.map(|s| s.nome.as_str()))),
            ("Apólice".to_string(), text_or_dash(seguradora.and_then(|s| s.apolice.as_deref()))),
            ("Período".to_string(), periodo),
            ("Origem".to_string(), text_or_dash(averbacao.origem.as_deref())),
            ("Destino".to_string(), text_or_dash(averbacao.destino.as_deref())),
            ("Navio".to_string(), text_or_dash(averbacao.navio.as_deref())),
            (
                "Criada em".to_string(),
                format_opt_date(averbacao.created_at.map(|d| d.date_naive())),
            ),
        ];

        let rows: Vec<[String; 7]> = averbacao
            .containers
            .iter()
            .enumerate()
            .map(|(i, c)| {
                [
                    (i + 1).to_string(),
                    text_or_dash(Some(c.numero.as_str())),
                    text_or_dash(c.tipo.as_deref()),
                    text_or_dash(c.status.as_deref()),
                    c.peso_kg.map(format_number).unwrap_or_else(|| MISSING.to_string()),
                    format_brl(or_zero(c.valor_mercadoria)),
                    format_brl(or_zero(c.premio)),
                ]
            })
            .collect();

        let pages = rows.chunks(rows_per_page.max(1)).map(<[_]>::to_vec).collect();

        Self {
            title: format!("Relatório de Averbação {}", averbacao.numero),
            generated_at: generated_at.format("%d/%m/%Y %H:%M").to_string(),
            header,
            totals: ReportTotals::compute(&averbacao.containers),
            pages,
            qr_payload: format!("AVERBACAO:{}:{}", averbacao.numero, averbacao.id),
            file_name: report_file_name(averbacao),
        }
    }
}

/// `averbacao_<numero>[_<inicio>_a_<fim>].pdf`, só com `[A-Za-z0-9_-]`.
pub fn report_file_name(averbacao: &Averbacao) -> String {
    let mut stem = format!("averbacao_{}", averbacao.numero);
    if let (Some(inicio), Some(fim)) = (averbacao.data_inicio, averbacao.data_fim) {
        stem.push_str(&format!("_{}_a_{}", inicio.format("%d-%m-%Y"), fim.format("%d-%m-%Y")));
    }

    let sanitized: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect();
    format!("{}.pdf", sanitized)
}

/// PDF pronto para download.
#[derive(Debug, Clone)]
pub struct ReportDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ReportSettings {
    pub fonts_dir: PathBuf,
    pub font_family: String,
    pub rows_per_page: usize,
}

#[derive(Clone)]
pub struct ReportService {
    backend: Arc<dyn BackendApi>,
    settings: ReportSettings,
}

impl ReportService {
    pub fn new(backend: Arc<dyn BackendApi>, settings: ReportSettings) -> Self {
        Self { backend, settings }
    }

    pub async fn generate_averbacao_pdf(&self, session: &Session, id: Uuid) -> Result<ReportDocument, AppError> {
        // 1. Busca os dados
        let averbacao = self.backend.fetch_averbacao(&session.access_token, id).await?;

        // 2. Monta e renderiza fora do runtime (genpdf é síncrono)
        let layout = ReportLayout::build(&averbacao, Utc::now(), self.settings.rows_per_page);
        let settings = self.settings.clone();
        let file_name = layout.file_name.clone();

        let bytes = tokio::task::spawn_blocking(move || render_pdf(&layout, &settings))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de renderização: {}", e))??;

        tracing::info!(
            "📄 Relatório {} gerado ({} containers, {} bytes)",
            file_name,
            averbacao.containers.len(),
            bytes.len()
        );
        Ok(ReportDocument { file_name, bytes })
    }
}

pub fn render_pdf(layout: &ReportLayout, settings: &ReportSettings) -> Result<Vec<u8>, AppError> {
    // Carrega a fonte da pasta configurada
    let font_family = genpdf::fonts::from_files(&settings.fonts_dir, &settings.font_family, None).map_err(|_| {
        AppError::FontNotFound(format!(
            "Fonte '{}' não encontrada em {}",
            settings.font_family,
            settings.fonts_dir.display()
        ))
    })?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(layout.title.clone());
    doc.set_paper_size(genpdf::PaperSize::A4);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO ---
    doc.push(elements::Paragraph::new(layout.title.clone()).styled(style::Style::new().bold().with_font_size(16)));
    doc.push(
        elements::Paragraph::new(format!("Gerado em {}", layout.generated_at))
            .styled(style::Style::new().italic().with_font_size(8)),
    );
    doc.push(elements::Break::new(1));

    let mut header = elements::TableLayout::new(vec![1, 3]);
    for (key, value) in &layout.header {
        header
            .row()
            .element(elements::Paragraph::new(key.clone()).styled(style::Style::new().bold()))
            .element(elements::Paragraph::new(value.clone()))
            .push()?;
    }
    doc.push(header);
    doc.push(elements::Break::new(1.5));

    // --- TOTAIS ---
    doc.push(elements::Paragraph::new("TOTAIS").styled(style::Style::new().bold().with_font_size(12)));
    let mut totals = elements::TableLayout::new(vec![3, 1, 3, 3]);
    totals.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
    let style_bold = style::Style::new().bold();
    totals
        .row()
        .element(elements::Paragraph::new("Status").styled(style_bold))
        .element(elements::Paragraph::new("Qtd").styled(style_bold))
        .element(elements::Paragraph::new("Valor mercadoria").styled(style_bold))
        .element(elements::Paragraph::new("Prêmio").styled(style_bold))
        .push()?;
    for (status, bucket) in &layout.totals.by_status {
        totals
            .row()
            .element(elements::Paragraph::new(status.clone()))
            .element(elements::Paragraph::new(bucket.count.to_string()))
            .element(elements::Paragraph::new(format_brl(bucket.valor_mercadoria)))
            .element(elements::Paragraph::new(format_brl(bucket.premio)))
            .push()?;
    }
    let overall = &layout.totals.overall;
    totals
        .row()
        .element(elements::Paragraph::new("TOTAL GERAL").styled(style_bold))
        .element(elements::Paragraph::new(overall.count.to_string()).styled(style_bold))
        .element(elements::Paragraph::new(format_brl(overall.valor_mercadoria)).styled(style_bold))
        .element(elements::Paragraph::new(format_brl(overall.premio)).styled(style_bold))
        .push()?;
    doc.push(totals);
    doc.push(elements::Break::new(1.5));

    // --- CONFERÊNCIA (QR CODE) ---
    let code = QrCode::new(layout.qr_payload.as_bytes()).map_err(|e| AppError::Report(e.to_string()))?;
    let image_buffer = code.render::<Luma<u8>>().build();
    let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);
    let qr = elements::Image::from_dynamic_image(dynamic_image)?.with_scale(genpdf::Scale::new(0.4, 0.4));
    doc.push(qr);

    // --- CONTAINERS, uma tabela por página com cabeçalho repetido ---
    let total_pages = layout.pages.len();
    for (index, rows) in layout.pages.iter().enumerate() {
        doc.push(elements::PageBreak::new());
        doc.push(
            elements::Paragraph::new(format!("Containers (página {} de {})", index + 1, total_pages))
                .styled(style::Style::new().bold().with_font_size(12)),
        );

        let mut table = elements::TableLayout::new(TABLE_WEIGHTS.to_vec());
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));
        let mut head = table.row();
        for title in TABLE_HEADER {
            head.push_element(elements::Paragraph::new(title).styled(style_bold));
        }
        head.push()?;

        for row in rows {
            let mut line = table.row();
            for cell in row {
                line.push_element(elements::Paragraph::new(cell.clone()).styled(style::Style::new().with_font_size(9)));
            }
            line.push()?;
        }
        doc.push(table);
    }

    if layout.pages.is_empty() {
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new("Nenhum container vinculado a esta averbação."));
    }

    // Renderiza para buffer (memória)
    let mut buffer = Vec::new();
    doc.render(&mut buffer)?;
    Ok(buffer)
}
