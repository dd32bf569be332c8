use chrono::{DateTime, Local};

use super::canvas::PageCanvas;
use crate::error::DanfeError;
use crate::models::{Invoice, Party};

const TITLE_SIZE: f32 = 14.0;
const SUBTITLE_SIZE: f32 = 12.0;
const BODY_SIZE: f32 = 10.0;

/// Renders the extracted invoice record into the DANFE page layout.
pub struct DanfeRenderer {
    generated_at: DateTime<Local>,
}

impl DanfeRenderer {
    pub fn new() -> Self {
        Self {
            generated_at: Local::now(),
        }
    }

    /// Pin the footer timestamp, making the output byte-for-byte reproducible.
    pub fn with_generated_at(generated_at: DateTime<Local>) -> Self {
        Self { generated_at }
    }

    /// Stream the fixed section sequence onto a fresh canvas and serialize it.
    pub fn render(&self, invoice: &Invoice) -> Result<Vec<u8>, DanfeError> {
        let mut canvas = PageCanvas::new();

        // Header
        canvas.centered_line(
            TITLE_SIZE,
            "DANFE - Documento Auxiliar da Nota Fiscal Eletrônica",
        )?;
        canvas.centered_line(
            SUBTITLE_SIZE,
            &format!("Chave de Acesso: {}", invoice.access_key),
        )?;
        canvas.centered_line(
            BODY_SIZE,
            "Consulta de autenticidade no portal nacional da NF-e",
        )?;
        canvas.gap();

        self.party_block(&mut canvas, "Emitente:", &invoice.issuer)?;
        self.party_block(&mut canvas, "Destinatário:", &invoice.recipient)?;

        // Products
        canvas.section("Produtos:")?;
        for item in &invoice.items {
            canvas.line(BODY_SIZE, &format!("Código: {}", item.code))?;
            canvas.line(BODY_SIZE, &format!("Descrição: {}", item.description))?;
            canvas.line(
                BODY_SIZE,
                &format!("Quantidade: {} {}", item.quantity, item.unit),
            )?;
            canvas.line(
                BODY_SIZE,
                &format!("Valor Unitário: {}", currency(item.unit_price)),
            )?;
            canvas.line(BODY_SIZE, &format!("Valor Total: {}", currency(item.total)))?;
        }
        canvas.gap();

        // Totals
        canvas.section("Totais:")?;
        canvas.line(
            BODY_SIZE,
            &format!(
                "Valor Total dos Produtos: {}",
                currency(invoice.totals.products)
            ),
        )?;
        canvas.line(
            BODY_SIZE,
            &format!("Valor Total da Nota: {}", currency(invoice.totals.invoice)),
        )?;
        canvas.gap();

        // Transport
        canvas.section("Transportador / Volumes Transportados:")?;
        canvas.line(
            BODY_SIZE,
            &format!(
                "Frete por Conta: {}",
                invoice.transport.freight_payer.role_label()
            ),
        )?;
        canvas.line(
            BODY_SIZE,
            &format!("Espécie: {}", invoice.transport.volume_kind),
        )?;
        canvas.gap();

        // Free-text notes, verbatim
        canvas.section("Dados Adicionais:")?;
        canvas.line(BODY_SIZE, &invoice.additional_info)?;
        canvas.gap();

        // Footer
        canvas.centered_line(BODY_SIZE, &self.footer_line())?;

        canvas.finish()
    }

    fn party_block(
        &self,
        canvas: &mut PageCanvas,
        label: &str,
        party: &Party,
    ) -> Result<(), DanfeError> {
        let addr = &party.address;
        canvas.section(label)?;
        canvas.line(BODY_SIZE, &format!("Nome: {}", party.name))?;
        canvas.line(BODY_SIZE, &format!("CNPJ: {}", party.cnpj))?;
        canvas.line(
            BODY_SIZE,
            &format!(
                "Endereço: {}, {}, {}",
                addr.street, addr.number, addr.complement
            ),
        )?;
        canvas.line(
            BODY_SIZE,
            &format!(
                "Bairro: {}, {} - {}",
                addr.district, addr.municipality, addr.state
            ),
        )?;
        canvas.line(
            BODY_SIZE,
            &format!("CEP: {}, País: {}", addr.postal_code, addr.country),
        )?;
        canvas.line(BODY_SIZE, &format!("IE: {}", party.state_registration))?;
        canvas.gap();
        Ok(())
    }

    fn footer_line(&self) -> String {
        format!(
            "Gerado em {} pelo danfe-rust | NF-e OPEN Source | www.uninfe.com.br",
            self.generated_at.format("%d/%m/%Y às %H:%M")
        )
    }
}

impl Default for DanfeRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixed-point currency with the real-sign prefix: `R$ 10.50`
fn currency(value: f64) -> String {
    format!("R$ {value:.2}")
}
