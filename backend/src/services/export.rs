use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::contracts::ExportResult;
use crate::models::{DashboardTile, ExportFormat};
use crate::services::file_store::FileStore;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no renderer registered for {0}")]
    NoRenderer(ExportFormat),

    #[error("rendering failed: {0}")]
    Failed(String),

    #[error("file store error: {0}")]
    Storage(#[from] std::io::Error),
}

pub struct RenderRequest<'a> {
    pub user_id: i32,
    pub generated_at: DateTime<Utc>,
    pub tiles: &'a [DashboardTile],
}

/// Renders a dashboard into one artifact format.
pub trait DashboardRenderer: Send + Sync {
    fn format(&self) -> ExportFormat;

    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, RenderError>;
}

/// Renderers by export format.
#[derive(Clone, Default)]
pub struct RendererRegistry {
    renderers: HashMap<ExportFormat, Arc<dyn DashboardRenderer>>,
}

impl RendererRegistry {
    /// Registry with every built-in renderer.
    pub fn with_defaults() -> Self {
        let mut registry = Self::default();
        registry.register(Arc::new(PdfLayoutRenderer));
        registry
    }

    pub fn register(&mut self, renderer: Arc<dyn DashboardRenderer>) {
        self.renderers.insert(renderer.format(), renderer);
    }

    pub fn get(&self, format: ExportFormat) -> Result<Arc<dyn DashboardRenderer>, RenderError> {
        self.renderers
            .get(&format)
            .cloned()
            .ok_or(RenderError::NoRenderer(format))
    }

    pub fn supports(&self, format: ExportFormat) -> bool {
        self.renderers.contains_key(&format)
    }
}

/// Renders with the registered renderer and stores the artifact under `export_dir`.
pub async fn export_dashboard(
    registry: &RendererRegistry,
    store: &dyn FileStore,
    export_dir: &str,
    format: ExportFormat,
    request: &RenderRequest<'_>,
) -> Result<ExportResult, RenderError> {
    let renderer = registry.get(format)?;
    let bytes = renderer.render(request)?;

    let file_path = format!(
        "{}/dashboard-{}-{}.{}",
        export_dir.trim_end_matches('/'),
        request.user_id,
        Uuid::new_v4(),
        format.extension()
    );
    let file_size = store.write(&file_path, &bytes).await?;

    log::info!(
        "Exported {} tiles for user {} to {} ({} bytes)",
        request.tiles.len(),
        request.user_id,
        file_path,
        file_size
    );

    Ok(ExportResult {
        file_path,
        file_size: i64::try_from(file_size).map_err(|e| RenderError::Failed(e.to_string()))?,
        created_at: request.generated_at,
    })
}

// ============================================================================
// PDF
// ============================================================================

const PAGE_WIDTH: u32 = 595;
const PAGE_HEIGHT: u32 = 842;
const LINES_PER_PAGE: usize = 50;

/// Single-font text PDF listing the layout of every tile.
pub struct PdfLayoutRenderer;

impl DashboardRenderer for PdfLayoutRenderer {
    fn format(&self) -> ExportFormat {
        ExportFormat::Pdf
    }

    fn render(&self, request: &RenderRequest<'_>) -> Result<Vec<u8>, RenderError> {
        let mut lines = vec![
            format!("Dashboard export for user {}", request.user_id),
            format!("Generated {}", request.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
            String::new(),
        ];

        if request.tiles.is_empty() {
            lines.push("No visible tiles.".to_string());
        }
        for tile in request.tiles {
            lines.push(format!(
                "{} [{}] at ({}, {}) size {}x{}",
                tile.title, tile.kind, tile.position_x, tile.position_y, tile.width, tile.height
            ));
        }

        let pages: Vec<&[String]> = lines.chunks(LINES_PER_PAGE).collect();
        Ok(write_pdf(&pages))
    }
}

fn write_pdf(pages: &[&[String]]) -> Vec<u8> {
    // 1: catalog, 2: page tree, 3: font, then a (page, content) pair per page
    let mut objects = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        String::new(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
    ];

    let mut kids = Vec::with_capacity(pages.len());
    for lines in pages {
        let page_id = objects.len() + 1;
        kids.push(format!("{page_id} 0 R"));
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 3 0 R >> >> /Contents {} 0 R >>",
            page_id + 1
        ));
        let stream = content_stream(lines);
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}\nendstream",
            stream.len(),
            stream
        ));
    }
    objects[1] = format!(
        "<< /Type /Pages /Kids [{}] /Count {} >>",
        kids.join(" "),
        pages.len()
    );

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (index, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        out.push_str(&format!("{} 0 obj\n{}\nendobj\n", index + 1, body));
    }

    let xref_offset = out.len();
    out.push_str(&format!("xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1));
    for offset in offsets {
        out.push_str(&format!("{offset:010} 00000 n \n"));
    }
    out.push_str(&format!(
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        xref_offset
    ));
    out.into_bytes()
}

fn content_stream(lines: &[String]) -> String {
    let mut stream = format!("BT\n/F1 11 Tf\n14 TL\n50 {} Td\n", PAGE_HEIGHT - 60);
    for line in lines {
        stream.push_str(&format!("({}) Tj T*\n", escape_pdf_text(line)));
    }
    stream.push_str("ET");
    stream
}

/// Helvetica only covers ASCII here; anything else becomes `?`.
fn escape_pdf_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '(' | ')' | '\\' => {
                escaped.push('\\');
                escaped.push(ch);
            }
            ' '..='~' => escaped.push(ch),
            _ => escaped.push('?'),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TileType;
    use crate::services::file_store::LocalFileStore;
    use chrono::TimeZone;

    fn tile(id: i32, title: &str, kind: TileType, x: i32, y: i32) -> DashboardTile {
        let now = Utc::now();
        DashboardTile {
            id,
            user_id: 4,
            kind,
            title: title.to_string(),
            position_x: x,
            position_y: y,
            width: 2,
            height: 1,
            config: None,
            is_visible: true,
            created_at: now,
            updated_at: now,
        }
    }

    fn request(tiles: &[DashboardTile]) -> RenderRequest<'_> {
        RenderRequest {
            user_id: 4,
            generated_at: Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap(),
            tiles,
        }
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn test_pdf_lists_tiles() {
        let tiles = vec![
            tile(1, "Grid load", TileType::PowerStats, 0, 0),
            tile(2, "Air (north)", TileType::AirQuality, 2, 0),
        ];
        let pdf = PdfLayoutRenderer.render(&request(&tiles)).unwrap();

        assert!(pdf.starts_with(b"%PDF-1.4"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(find(&pdf, b"(Grid load [power_stats] at \\(0, 0\\) size 2x1)").is_some());
        assert!(find(&pdf, b"(Air \\(north\\) [air_quality]").is_some());
        assert!(find(&pdf, b"Generated 2024-05-01 08:30:00 UTC").is_some());
    }

    #[test]
    fn test_pdf_xref_offsets_point_at_objects() {
        let tiles: Vec<DashboardTile> = (0..120)
            .map(|i| tile(i, &format!("Tile {i}"), TileType::DeviceStatus, i, 0))
            .collect();
        let pdf = PdfLayoutRenderer.render(&request(&tiles)).unwrap();
        let text = String::from_utf8(pdf).unwrap();

        let startxref = text.rfind("startxref\n").unwrap() + "startxref\n".len();
        let xref_offset: usize = text[startxref..].lines().next().unwrap().parse().unwrap();
        assert!(text[xref_offset..].starts_with("xref\n"));

        let entries: Vec<&str> = text[xref_offset..].lines().skip(3).collect();
        // entries are 20 bytes, trailing space and newline included
        assert_eq!(entries[0].len(), 19);
        let mut checked = 0;
        for (index, entry) in entries
            .iter()
            .map(|l| l.trim_end())
            .take_while(|l| l.ends_with(" n"))
            .enumerate()
        {
            let offset: usize = entry[..10].parse().unwrap();
            assert!(text[offset..].starts_with(&format!("{} 0 obj", index + 1)));
            checked += 1;
        }
        // catalog, pages, font + 3 pages of (page, content)
        assert_eq!(checked, 9);
        assert!(text.contains("/Count 3"));
    }

    #[test]
    fn test_escape_pdf_text() {
        assert_eq!(escape_pdf_text(r"a(b)c\d"), r"a\(b\)c\\d");
        assert_eq!(escape_pdf_text("Zużycie"), "Zu?ycie");
    }

    #[test]
    fn test_registry_defaults() {
        let registry = RendererRegistry::with_defaults();
        assert!(registry.supports(ExportFormat::Pdf));
        assert!(!registry.supports(ExportFormat::Jpg));
        assert!(matches!(
            registry.get(ExportFormat::Jpg),
            Err(RenderError::NoRenderer(ExportFormat::Jpg))
        ));
    }

    #[actix_rt::test]
    async fn test_export_writes_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let registry = RendererRegistry::with_defaults();
        let tiles = vec![tile(1, "Grid load", TileType::PowerStats, 0, 0)];

        let result = export_dashboard(&registry, &store, "exports/", ExportFormat::Pdf, &request(&tiles))
            .await
            .unwrap();

        assert!(result.file_path.starts_with("exports/dashboard-4-"));
        assert!(result.file_path.ends_with(".pdf"));
        assert_eq!(result.created_at, Utc.with_ymd_and_hms(2024, 5, 1, 8, 30, 0).unwrap());
        assert_eq!(
            store.size(&result.file_path).await.unwrap(),
            Some(result.file_size as u64)
        );
    }

    #[actix_rt::test]
    async fn test_export_without_renderer() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFileStore::new(dir.path());
        let registry = RendererRegistry::with_defaults();

        let err = export_dashboard(&registry, &store, "exports", ExportFormat::Jpg, &request(&[]))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::NoRenderer(ExportFormat::Jpg)));
    }
}
