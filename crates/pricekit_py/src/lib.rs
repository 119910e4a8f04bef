use pricekit_io_xlsx::sanitize_sheet_name as rs_sanitize_sheet_name;
use pricekit_survey::conf::{C_EXPORT_FILE_NAME, C_EXPORT_MIME_TYPE};
use pricekit_survey::{
    SpecExportArtifact, SpecSurveyRow, SurveyError, build_report, convert_price_text,
    serialize_report,
};
use pyo3::exceptions::{PyPermissionError, PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyBytes;

const N_BRIDGE_ABI_VERSION: u64 = 1;
const C_BRIDGE_CONTRACT_VERSION: &str = "pricekit.survey.report.v1";
const C_BRIDGE_TRANSPORT: &str = "rust_native";

#[pyclass(name = "ExportArtifact")]
#[derive(Debug, Clone)]
struct PyExportArtifact {
    #[pyo3(get)]
    file_name: String,
    #[pyo3(get)]
    mime_type: String,
    #[pyo3(get)]
    sheet_names: Vec<String>,
    #[pyo3(get)]
    warnings: Vec<String>,
    bytes: Vec<u8>,
}

#[pymethods]
impl PyExportArtifact {
    #[getter]
    fn data<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &self.bytes)
    }
}

impl From<SpecExportArtifact> for PyExportArtifact {
    fn from(artifact: SpecExportArtifact) -> Self {
        Self {
            file_name: artifact.file_name,
            mime_type: artifact.mime_type,
            sheet_names: artifact.sheet_names,
            warnings: artifact.warnings,
            bytes: artifact.bytes,
        }
    }
}

fn derive_py_err(err: SurveyError) -> PyErr {
    match err {
        SurveyError::RowIndexOutOfRange { .. } => PyValueError::new_err(err.to_string()),
        SurveyError::PermissionDenied => PyPermissionError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn derive_survey_rows(rows: Vec<Vec<String>>) -> Vec<SpecSurveyRow> {
    rows.iter()
        .map(|cells| SpecSurveyRow::from_cells(cells.as_slice()))
        .collect()
}

fn export_rows(py: Python<'_>, rows: Vec<Vec<String>>) -> PyResult<SpecExportArtifact> {
    let l_rows = derive_survey_rows(rows);
    py.allow_threads(|| build_report(&l_rows).and_then(|report| serialize_report(&report)))
        .map_err(derive_py_err)
}

#[pyfunction]
fn normalize_price(text: &str) -> f64 {
    convert_price_text(text)
}

#[pyfunction]
#[pyo3(signature = (name, replace_to = ""))]
fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    rs_sanitize_sheet_name(name, replace_to)
}

/// Build the full report from positional rows and return workbook bytes.
#[pyfunction]
fn build_report_xlsx<'py>(py: Python<'py>, rows: Vec<Vec<String>>) -> PyResult<Bound<'py, PyBytes>> {
    let artifact = export_rows(py, rows)?;
    Ok(PyBytes::new(py, &artifact.bytes))
}

/// Same as `build_report_xlsx`, with the download metadata and warnings.
#[pyfunction]
fn export_report(py: Python<'_>, rows: Vec<Vec<String>>) -> PyResult<PyExportArtifact> {
    Ok(export_rows(py, rows)?.into())
}

#[pyfunction]
fn report_section_names(rows: Vec<Vec<String>>) -> PyResult<Vec<String>> {
    let report = build_report(&derive_survey_rows(rows)).map_err(derive_py_err)?;
    Ok(report.section_names())
}

/// `(row, col, value)` cell writes (1-based) persisting one row edit.
#[pyfunction]
fn plan_row_update(row_index: usize, price: &str, note: &str) -> Vec<(usize, usize, String)> {
    pricekit_survey::plan_row_update(row_index, price, note)
        .into_iter()
        .map(|update| (update.row, update.col, update.value))
        .collect()
}

#[pymodule]
fn _pricekit_rs(module: &Bound<'_, PyModule>) -> PyResult<()> {
    module.add_class::<PyExportArtifact>()?;
    module.add_function(wrap_pyfunction!(normalize_price, module)?)?;
    module.add_function(wrap_pyfunction!(sanitize_sheet_name, module)?)?;
    module.add_function(wrap_pyfunction!(build_report_xlsx, module)?)?;
    module.add_function(wrap_pyfunction!(export_report, module)?)?;
    module.add_function(wrap_pyfunction!(report_section_names, module)?)?;
    module.add_function(wrap_pyfunction!(plan_row_update, module)?)?;
    module.add("EXPORT_FILE_NAME", C_EXPORT_FILE_NAME)?;
    module.add("EXPORT_MIME_TYPE", C_EXPORT_MIME_TYPE)?;
    module.add("__bridge_abi__", N_BRIDGE_ABI_VERSION)?;
    module.add("__bridge_contract__", C_BRIDGE_CONTRACT_VERSION)?;
    module.add("__bridge_transport__", C_BRIDGE_TRANSPORT)?;
    Ok(())
}
