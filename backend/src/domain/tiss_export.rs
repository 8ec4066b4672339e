//! TISS XML export for SP/SADT guides.
//!
//! The document follows a fixed TISS 4.01.00 layout: a header identifying the
//! transaction, one batch holding one guide, one `procedimentoExecutado` per
//! approved procedure and a closing total block. Only procedures whose audit
//! status is "APPROVED" are exported; a guide with none of them produces no
//! document at all.

use chrono::{Local, NaiveDateTime};
use shared::{ExportGuideResult, ExportOptions, Procedure};
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{error, info};

pub const TISS_VERSION: &str = "4.01.00";
const TRANSACTION_TYPE: &str = "ENVIO_LOTE_GUIAS";
const PROCEDURE_TABLE_CODE: &str = "22";

#[derive(Debug, thiserror::Error)]
pub enum TissExportError {
    #[error("No approved procedures to export")]
    NoApprovedProcedures,
    #[error("Failed to write export file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Escape the five XML-reserved characters.
///
/// `&` goes first so the entities produced by the later substitutions are
/// not escaped a second time.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Two-decimal amount, with ties rounded away from zero
///
/// `{:.2}` alone rounds exact binary ties such as `12.125` to even.
pub fn format_money(value: f64) -> String {
    format!("{:.2}", (value * 100.0).round() / 100.0)
}

/// Build the TISS document stamped with the current local time
pub fn generate_tiss_xml(options: &ExportOptions) -> Result<String, TissExportError> {
    generate_tiss_xml_at(options, Local::now().naive_local())
}

/// Build the TISS document stamped with `now`
pub fn generate_tiss_xml_at(options: &ExportOptions, now: NaiveDateTime) -> Result<String, TissExportError> {
    let approved: Vec<&Procedure> = options.procedures.iter().filter(|p| p.is_approved()).collect();
    if approved.is_empty() {
        return Err(TissExportError::NoApprovedProcedures);
    }

    let total: f64 = approved.iter().map(|p| p.total_value).sum();
    let date = now.format("%Y-%m-%d").to_string();
    let time = now.format("%H:%M:%S").to_string();
    let registry_id = escape_xml(options.registry_id());
    let batch_number = escape_xml(options.batch_number());
    let guide_number = escape_xml(&options.guide_number);

    let mut xml = String::new();
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<ans:mensagemTISS xmlns:ans=\"http://www.ans.gov.br/padroes/tiss/schemas\">\n");

    xml.push_str("  <ans:cabecalho>\n");
    xml.push_str("    <ans:identificacaoTransacao>\n");
    xml.push_str(&format!("      <ans:tipoTransacao>{}</ans:tipoTransacao>\n", TRANSACTION_TYPE));
    xml.push_str(&format!("      <ans:sequencialTransacao>{}</ans:sequencialTransacao>\n", batch_number));
    xml.push_str(&format!("      <ans:dataRegistroTransacao>{}</ans:dataRegistroTransacao>\n", date));
    xml.push_str(&format!("      <ans:horaRegistroTransacao>{}</ans:horaRegistroTransacao>\n", time));
    xml.push_str("    </ans:identificacaoTransacao>\n");
    xml.push_str("    <ans:destino>\n");
    xml.push_str(&format!("      <ans:registroANS>{}</ans:registroANS>\n", registry_id));
    xml.push_str("    </ans:destino>\n");
    xml.push_str(&format!("    <ans:Padrao>{}</ans:Padrao>\n", TISS_VERSION));
    xml.push_str("  </ans:cabecalho>\n");

    xml.push_str("  <ans:prestadorParaOperadora>\n");
    xml.push_str("    <ans:loteGuias>\n");
    xml.push_str(&format!("      <ans:numeroLote>{}</ans:numeroLote>\n", batch_number));
    xml.push_str("      <ans:guiasTISS>\n");
    xml.push_str("        <ans:guiaSP-SADT>\n");
    xml.push_str("          <ans:cabecalhoGuia>\n");
    xml.push_str(&format!("            <ans:registroANS>{}</ans:registroANS>\n", registry_id));
    xml.push_str(&format!("            <ans:numeroGuiaPrestador>{}</ans:numeroGuiaPrestador>\n", guide_number));
    xml.push_str("          </ans:cabecalhoGuia>\n");
    xml.push_str("          <ans:procedimentosExecutados>\n");

    for procedure in &approved {
        push_procedure(&mut xml, procedure, &date);
    }

    xml.push_str("          </ans:procedimentosExecutados>\n");
    xml.push_str("          <ans:valorTotal>\n");
    xml.push_str(&format!(
        "            <ans:valorProcedimentos>{}</ans:valorProcedimentos>\n",
        format_money(total)
    ));
    xml.push_str(&format!(
        "            <ans:valorTotalGeral>{}</ans:valorTotalGeral>\n",
        format_money(total)
    ));
    xml.push_str("          </ans:valorTotal>\n");
    xml.push_str("        </ans:guiaSP-SADT>\n");
    xml.push_str("      </ans:guiasTISS>\n");
    xml.push_str("    </ans:loteGuias>\n");
    xml.push_str("  </ans:prestadorParaOperadora>\n");
    xml.push_str("</ans:mensagemTISS>\n");

    Ok(xml)
}

fn push_procedure(xml: &mut String, procedure: &Procedure, date: &str) {
    xml.push_str("            <ans:procedimentoExecutado>\n");
    xml.push_str(&format!("              <ans:sequencialItem>{}</ans:sequencialItem>\n", procedure.sequence_index));
    xml.push_str(&format!("              <ans:dataExecucao>{}</ans:dataExecucao>\n", date));
    xml.push_str("              <ans:procedimento>\n");
    xml.push_str(&format!("                <ans:codigoTabela>{}</ans:codigoTabela>\n", PROCEDURE_TABLE_CODE));
    xml.push_str(&format!(
        "                <ans:codigoProcedimento>{}</ans:codigoProcedimento>\n",
        escape_xml(&procedure.code)
    ));
    xml.push_str(&format!(
        "                <ans:descricaoProcedimento>{}</ans:descricaoProcedimento>\n",
        escape_xml(&procedure.description)
    ));
    xml.push_str("              </ans:procedimento>\n");
    xml.push_str(&format!("              <ans:quantidadeExecutada>{}</ans:quantidadeExecutada>\n", procedure.quantity));
    xml.push_str(&format!(
        "              <ans:valorUnitario>{}</ans:valorUnitario>\n",
        format_money(procedure.unit_value)
    ));
    xml.push_str(&format!(
        "              <ans:valorTotal>{}</ans:valorTotal>\n",
        format_money(procedure.total_value)
    ));
    xml.push_str("            </ans:procedimentoExecutado>\n");
}

/// Writes TISS documents into the export directory
#[derive(Clone)]
pub struct TissExportService {
    export_dir: PathBuf,
}

impl TissExportService {
    pub fn new<P: AsRef<Path>>(export_dir: P) -> Self {
        Self {
            export_dir: export_dir.as_ref().to_path_buf(),
        }
    }

    /// Generate the guide's document and save it as
    /// `guia_<guide>_<YYYYMMDD_HHMMSS>.xml`.
    ///
    /// An existing file is never replaced: a second export of the same guide
    /// within the same second gets a `_2`, `_3`, ... suffix. Generator errors
    /// are returned as they are and nothing is written.
    pub fn export_guide_xml(&self, options: &ExportOptions) -> Result<ExportGuideResult, TissExportError> {
        self.export_guide_xml_at(options, Local::now().naive_local())
    }

    pub fn export_guide_xml_at(
        &self,
        options: &ExportOptions,
        now: NaiveDateTime,
    ) -> Result<ExportGuideResult, TissExportError> {
        info!(
            "Exporting guide {} with {} procedures",
            options.guide_number,
            options.procedures.len()
        );

        let xml = generate_tiss_xml_at(options, now)?;
        let (filename, file_path) = self.write_new_file(&export_filename(&options.guide_number, now), &xml)?;

        let approved: Vec<&Procedure> = options.procedures.iter().filter(|p| p.is_approved()).collect();
        let result = ExportGuideResult {
            filename,
            file_path: file_path.to_string_lossy().to_string(),
            procedure_count: approved.len(),
            total_value: approved.iter().map(|p| p.total_value).sum(),
        };

        info!(
            "Exported {} procedures (total {:.2}) to {}",
            result.procedure_count, result.total_value, result.file_path
        );
        Ok(result)
    }

    fn write_new_file(&self, filename: &str, content: &str) -> Result<(String, PathBuf), TissExportError> {
        fs::create_dir_all(&self.export_dir).map_err(|source| io_error(&self.export_dir, source))?;

        let stem = filename.strip_suffix(".xml").unwrap_or(filename);
        let mut attempt = 1;
        loop {
            let candidate = if attempt == 1 {
                filename.to_string()
            } else {
                format!("{}_{}.xml", stem, attempt)
            };
            let path = self.export_dir.join(&candidate);

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(mut file) => {
                    file.write_all(content.as_bytes())
                        .map_err(|source| io_error(&path, source))?;
                    return Ok((candidate, path));
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => attempt += 1,
                Err(source) => return Err(io_error(&path, source)),
            }
        }
    }
}

fn io_error(path: &Path, source: io::Error) -> TissExportError {
    error!("Failed to write TISS export to {}: {}", path.display(), source);
    TissExportError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// `guia_<guide>_<timestamp>.xml`, with anything unsafe for a filename replaced
pub fn export_filename(guide_number: &str, now: NaiveDateTime) -> String {
    let guide: String = guide_number
        .trim()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    let guide = if guide.is_empty() { "sem_numero".to_string() } else { guide };
    format!("guia_{}_{}.xml", guide, now.format("%Y%m%d_%H%M%S"))
}
