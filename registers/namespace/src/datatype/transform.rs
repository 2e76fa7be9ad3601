// Licensed under the Apache-2.0 license

use super::Datatype;
use crate::error::DatatypeError;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

/// A raw <-> cooked value conversion.
pub type TransformFn = Rc<dyn Fn(&Value) -> Value>;

/// Wraps a datatype with a decode step before rendering and an encode step
/// after lookup.
#[derive(Clone)]
pub struct TransformDatatype {
    inner: Rc<Datatype>,
    decode: TransformFn,
    encode: TransformFn,
}

impl TransformDatatype {
    pub fn new(
        inner: Rc<Datatype>,
        decode: impl Fn(&Value) -> Value + 'static,
        encode: impl Fn(&Value) -> Value + 'static,
    ) -> Self {
        Self {
            inner,
            decode: Rc::new(decode),
            encode: Rc::new(encode),
        }
    }

    pub fn inner(&self) -> &Rc<Datatype> {
        &self.inner
    }

    pub fn evaluate(&self, value: &Value) -> String {
        self.inner.evaluate(&(self.decode)(value))
    }

    pub fn lookup(&self, text: &str) -> Result<Value, DatatypeError> {
        Ok((self.encode)(&self.inner.lookup(text)?))
    }

    pub fn lookup_value(&self, value: &Value) -> Result<Value, DatatypeError> {
        Ok((self.encode)(&self.inner.lookup_value(value)?))
    }
}

impl fmt::Debug for TransformDatatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformDatatype")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}
