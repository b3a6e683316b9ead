use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::PyBytes;

use crate::{
    algebra, codec, parse_document, query, Entry, Error, GistOptions, HashMethod, QueryCache,
    QueryOperand, Signature, Split, Strategy,
};

impl From<Error> for PyErr {
    fn from(e: Error) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

fn options_for(hash_method: &str) -> PyResult<GistOptions> {
    let method: HashMethod = hash_method.parse()?;
    Ok(GistOptions::default().with_hash_method(method))
}

#[pyclass(name = "Signature")]
#[derive(Clone)]
struct PySignature {
    inner: Signature,
}

#[pymethods]
impl PySignature {
    #[staticmethod]
    #[pyo3(signature = (text, hash_method = "crc32"))]
    fn from_json(text: &str, hash_method: &str) -> PyResult<Self> {
        let doc = parse_document(text)?;
        let entry = Entry::leaf(&doc, &options_for(hash_method)?);
        Ok(PySignature {
            inner: entry.into_signature(),
        })
    }

    #[staticmethod]
    fn from_bytes(data: &[u8]) -> PyResult<Self> {
        Ok(PySignature {
            inner: codec::decode(data)?,
        })
    }

    #[staticmethod]
    fn saturated() -> Self {
        PySignature {
            inner: Signature::Saturated,
        }
    }

    fn to_bytes<'py>(&self, py: Python<'py>) -> Bound<'py, PyBytes> {
        PyBytes::new(py, &codec::encode(&self.inner))
    }

    fn union(&self, other: &PySignature) -> Self {
        PySignature {
            inner: algebra::union([&self.inner, &other.inner]),
        }
    }

    fn penalty(&self, other: &PySignature) -> f32 {
        algebra::penalty(&self.inner, &other.inner)
    }

    fn same(&self, other: &PySignature) -> bool {
        algebra::same(&self.inner, &other.inner)
    }

    fn is_saturated(&self) -> bool {
        self.inner.is_saturated()
    }

    fn popcount(&self) -> u32 {
        self.inner.popcount()
    }

    fn __str__(&self) -> String {
        self.inner.to_string()
    }

    fn __repr__(&self) -> String {
        format!("<Signature {}>", self.inner)
    }

    fn __eq__(&self, other: &PySignature) -> bool {
        self.inner == other.inner
    }
}

/// Index groups plus the union signature of each group.
type SplitResult = (Vec<usize>, Vec<usize>, PySignature, PySignature);

fn split_result(split: Split) -> SplitResult {
    (
        split.left,
        split.right,
        PySignature {
            inner: split.left_union,
        },
        PySignature {
            inner: split.right_union,
        },
    )
}

#[pymodule]
mod docsig {
    use pyo3::prelude::*;

    #[pymodule_export]
    use super::PySignature;

    #[pyfunction]
    fn pick_split(signatures: Vec<super::PySignature>) -> PyResult<super::SplitResult> {
        let entries: Vec<super::Signature> = signatures.into_iter().map(|s| s.inner).collect();
        let split = super::algebra::pick_split(&entries, &super::GistOptions::default())?;
        Ok(super::split_result(split))
    }

    #[pyfunction]
    #[pyo3(signature = (signature, strategy, operand, hash_method = "crc32"))]
    fn consistent(
        signature: &super::PySignature,
        strategy: u16,
        operand: &Bound<'_, PyAny>,
        hash_method: &str,
    ) -> PyResult<bool> {
        let strategy = super::Strategy::try_from(strategy)?;
        let operand = match strategy {
            super::Strategy::Contains => {
                super::QueryOperand::Document(super::parse_document(&operand.extract::<String>()?)?)
            }
            super::Strategy::Exists => super::QueryOperand::SingleKey(operand.extract()?),
            super::Strategy::ExistsAny | super::Strategy::ExistsAll => {
                super::QueryOperand::keys_skipping_nulls(operand.extract::<Vec<Option<String>>>()?)
            }
        };
        let options = super::options_for(hash_method)?;
        let mut cache = super::QueryCache::new();
        let verdict =
            super::query::consistent(&signature.inner, strategy, &operand, &mut cache, &options)?;
        Ok(verdict.matches)
    }
}
