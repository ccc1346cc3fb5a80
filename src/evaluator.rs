use std::{borrow::Cow, rc::Rc, vec};

use tracing::{debug, trace};

use crate::{
    ast::{CmpOp, Expr},
    compare::compare,
    error::{EvalError, Expected},
    options::Options,
    value::Value,
};

static NULL: Value = Value::Null;

/// The query evaluator.
///
/// Holds no state between evaluations; one evaluator (and one parsed tree)
/// can serve any number of documents.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Evaluator {
    limit: Option<usize>,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: &Options) -> Self {
        Evaluator {
            limit: options.limit,
        }
    }

    /// Evaluates an expression against a document and collects every result.
    ///
    /// Fails fast: the first error anywhere in the fanout is returned and no
    /// partial results are kept.
    ///
    /// # Examples
    ///
    /// ```
    /// use tq_lang::{Evaluator, Value, parser::parse};
    /// use serde_json::json;
    ///
    /// let expr = parse(".users[].email").unwrap();
    /// let doc = Value::from(json!({"users": [{"email": "a@x"}, {"email": "b@x"}]}));
    ///
    /// let results = Evaluator::new().evaluate(&expr, &doc).unwrap();
    /// assert_eq!(results, vec![Value::from("a@x"), Value::from("b@x")]);
    /// ```
    pub fn evaluate(&self, expr: &Expr, document: &Value) -> Result<Vec<Value>, EvalError> {
        let outputs = self.stream(expr, document);
        let results: Result<Vec<Value>, EvalError> = match self.limit {
            Some(limit) => outputs.take(limit).map(|r| r.map(Cow::into_owned)).collect(),
            None => outputs.map(|r| r.map(Cow::into_owned)).collect(),
        };

        match &results {
            Ok(values) => trace!(count = values.len(), "evaluation finished"),
            Err(e) => debug!(error = %e, "evaluation failed"),
        }
        results
    }

    /// Lazily yields the results of `expr` on `document`, in order.
    ///
    /// Values that live in the document are yielded borrowed. After an error
    /// the stream ends.
    pub fn stream<'a>(&self, expr: &'a Expr, document: &'a Value) -> Outputs<'a> {
        Outputs::new(expr, Cow::Borrowed(document))
    }
}

/// Expressions still to run on each output of the current stage, innermost first.
type Cont<'a> = Option<Rc<Link<'a>>>;

struct Link<'a> {
    expr: &'a Expr,
    next: Cont<'a>,
}

// Long paths build long continuation lists; unlink them one at a time
impl Drop for Link<'_> {
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(link) = next {
            next = match Rc::try_unwrap(link) {
                Ok(mut link) => link.next.take(),
                Err(_) => None,
            };
        }
    }
}

fn then<'a>(expr: &'a Expr, next: Cont<'a>) -> Cont<'a> {
    Some(Rc::new(Link { expr, next }))
}

enum Frame<'a> {
    /// Run `expr` on `input`, feeding each output to `next`
    Eval {
        expr: &'a Expr,
        input: Cow<'a, Value>,
        next: Cont<'a>,
    },
    /// Children of an iterated container from `pos` on
    Elements {
        source: Cow<'a, Value>,
        pos: usize,
        next: Cont<'a>,
    },
    /// Children of a recursive-descent value from `pos` on
    Descend {
        source: Cow<'a, Value>,
        pos: usize,
        next: Cont<'a>,
    },
    /// Outputs computed ahead of time
    Buffered {
        values: vec::IntoIter<Cow<'a, Value>>,
        next: Cont<'a>,
    },
}

/// Lazy result stream of one evaluation, driven by an explicit work stack.
///
/// The top of the stack is always the earliest pending output, so results
/// come out in document order without buffering whole fanout stages.
pub struct Outputs<'a> {
    stack: Vec<Frame<'a>>,
}

impl<'a> Outputs<'a> {
    fn new(expr: &'a Expr, input: Cow<'a, Value>) -> Self {
        Outputs {
            stack: vec![Frame::Eval {
                expr,
                input,
                next: None,
            }],
        }
    }

    /// Hands `value` to the continuation, or returns it if none is left.
    fn emit(&mut self, value: Cow<'a, Value>, next: Cont<'a>) -> Option<Cow<'a, Value>> {
        match next {
            None => Some(value),
            Some(link) => {
                self.stack.push(Frame::Eval {
                    expr: link.expr,
                    input: value,
                    next: link.next.clone(),
                });
                None
            }
        }
    }

    fn step(&mut self, frame: Frame<'a>) -> Result<Option<Cow<'a, Value>>, EvalError> {
        match frame {
            Frame::Eval { expr, input, next } => self.eval(expr, input, next),
            Frame::Elements { source, pos, next } => match child(&source, pos) {
                Some(value) => {
                    self.stack.push(Frame::Elements {
                        source,
                        pos: pos + 1,
                        next: next.clone(),
                    });
                    Ok(self.emit(value, next))
                }
                None => Ok(None),
            },
            Frame::Descend { source, pos, next } => match child(&source, pos) {
                Some(value) => {
                    self.stack.push(Frame::Descend {
                        source,
                        pos: pos + 1,
                        next: next.clone(),
                    });
                    self.stack.push(Frame::Descend {
                        source: value.clone(),
                        pos: 0,
                        next: next.clone(),
                    });
                    Ok(self.emit(value, next))
                }
                None => Ok(None),
            },
            Frame::Buffered { mut values, next } => match values.next() {
                Some(value) => {
                    self.stack.push(Frame::Buffered {
                        values,
                        next: next.clone(),
                    });
                    Ok(self.emit(value, next))
                }
                None => Ok(None),
            },
        }
    }

    fn eval(
        &mut self,
        expr: &'a Expr,
        input: Cow<'a, Value>,
        next: Cont<'a>,
    ) -> Result<Option<Cow<'a, Value>>, EvalError> {
        match expr {
            Expr::Identity => Ok(self.emit(input, next)),
            Expr::Field(name) => {
                let value = field(input, name)?;
                Ok(self.emit(value, next))
            }
            Expr::Index(index) => {
                let value = element(input, *index)?;
                Ok(self.emit(value, next))
            }
            Expr::Slice { start, end } => {
                let value = slice(input, *start, *end)?;
                Ok(self.emit(Cow::Owned(value), next))
            }
            Expr::Iterate => {
                if !matches!(*input, Value::Array(_) | Value::Object(_)) {
                    return Err(EvalError::type_mismatch(
                        Expected::ArrayOrObject,
                        input.kind(),
                    ));
                }
                self.stack.push(Frame::Elements {
                    source: input,
                    pos: 0,
                    next,
                });
                Ok(None)
            }
            Expr::RecursiveDescent => {
                self.stack.push(Frame::Descend {
                    source: input.clone(),
                    pos: 0,
                    next: next.clone(),
                });
                Ok(self.emit(input, next))
            }
            Expr::Pipe(left, right) => {
                self.stack.push(Frame::Eval {
                    expr: left,
                    input,
                    next: then(right, next),
                });
                Ok(None)
            }
            Expr::Comma(left, right) => {
                self.stack.push(Frame::Eval {
                    expr: right,
                    input: input.clone(),
                    next: next.clone(),
                });
                self.stack.push(Frame::Eval {
                    expr: left,
                    input,
                    next,
                });
                Ok(None)
            }
            Expr::Optional(inner) => {
                let values = outputs_of(inner, &input, true)?;
                self.buffer(values, next)
            }
            Expr::Literal(value) => Ok(self.emit(Cow::Borrowed(value), next)),
            Expr::Not => {
                let value = Value::Boolean(!input.is_truthy());
                Ok(self.emit(Cow::Owned(value), next))
            }
            Expr::Select(condition) => {
                let mut passes = 0;
                for value in outputs_of(condition, &input, false)? {
                    if value.is_truthy() {
                        passes += 1;
                    }
                }
                let values = vec![input; passes];
                self.buffer(values, next)
            }
            Expr::Compare { op, left, right } => {
                let values = compare_outputs(*op, left, right, &input)?;
                self.buffer(values, next)
            }
            Expr::And(left, right) => {
                let values = logical_outputs(left, right, &input, false)?;
                self.buffer(values, next)
            }
            Expr::Or(left, right) => {
                let values = logical_outputs(left, right, &input, true)?;
                self.buffer(values, next)
            }
        }
    }

    fn buffer(
        &mut self,
        values: Vec<Cow<'a, Value>>,
        next: Cont<'a>,
    ) -> Result<Option<Cow<'a, Value>>, EvalError> {
        self.stack.push(Frame::Buffered {
            values: values.into_iter(),
            next,
        });
        Ok(None)
    }
}

impl<'a> Iterator for Outputs<'a> {
    type Item = Result<Cow<'a, Value>, EvalError>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(frame) = self.stack.pop() {
            match self.step(frame) {
                Ok(Some(value)) => return Some(Ok(value)),
                Ok(None) => continue,
                Err(e) => {
                    self.stack.clear();
                    return Some(Err(e));
                }
            }
        }
        None
    }
}

fn field<'a>(input: Cow<'a, Value>, name: &str) -> Result<Cow<'a, Value>, EvalError> {
    match input {
        Cow::Borrowed(Value::Object(map)) => {
            Ok(map.get(name).map_or(Cow::Borrowed(&NULL), Cow::Borrowed))
        }
        Cow::Owned(Value::Object(mut map)) => {
            Ok(Cow::Owned(map.swap_remove(name).unwrap_or(Value::Null)))
        }
        other => Err(EvalError::type_mismatch(Expected::Object, other.kind())),
    }
}

/// Resolves a possibly negative index against a length.
fn normalize(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let index = if index < 0 { len + index } else { index };
    (0..len).contains(&index).then_some(index as usize)
}

fn element<'a>(input: Cow<'a, Value>, index: i64) -> Result<Cow<'a, Value>, EvalError> {
    match input {
        Cow::Borrowed(Value::Array(arr)) => Ok(normalize(index, arr.len())
            .map_or(Cow::Borrowed(&NULL), |i| Cow::Borrowed(&arr[i]))),
        Cow::Owned(Value::Array(mut arr)) => Ok(Cow::Owned(
            normalize(index, arr.len()).map_or(Value::Null, |i| arr.swap_remove(i)),
        )),
        other => Err(EvalError::type_mismatch(Expected::Array, other.kind())),
    }
}

/// Clamps a possibly negative slice bound into `0..=len`.
fn clamp(bound: i64, len: usize) -> usize {
    let len = i64::try_from(len).unwrap_or(i64::MAX);
    let bound = if bound < 0 { len.saturating_add(bound) } else { bound };
    bound.clamp(0, len) as usize
}

fn slice(input: Cow<'_, Value>, start: Option<i64>, end: Option<i64>) -> Result<Value, EvalError> {
    let Value::Array(_) = &*input else {
        return Err(EvalError::type_mismatch(Expected::Array, input.kind()));
    };
    let len = input.as_array().map_or(0, <[Value]>::len);
    let from = start.map_or(0, |s| clamp(s, len));
    let to = end.map_or(len, |e| clamp(e, len)).max(from);

    Ok(match input {
        Cow::Owned(Value::Array(mut arr)) => Value::Array(arr.drain(from..to).collect()),
        other => Value::Array(other.as_array().map_or_else(Vec::new, |arr| arr[from..to].to_vec())),
    })
}

/// The `pos`-th array element or object value of a container.
fn child<'a>(source: &Cow<'a, Value>, pos: usize) -> Option<Cow<'a, Value>> {
    fn nth(value: &Value, pos: usize) -> Option<&Value> {
        match value {
            Value::Array(arr) => arr.get(pos),
            Value::Object(map) => map.get_index(pos).map(|(_, v)| v),
            _ => None,
        }
    }

    match source {
        Cow::Borrowed(value) => {
            let value: &'a Value = *value;
            nth(value, pos).map(Cow::Borrowed)
        }
        Cow::Owned(value) => nth(value, pos).cloned().map(Cow::Owned),
    }
}

/// Runs `expr` on `input` to completion. A `tolerant` run ends quietly at
/// the first error, keeping what came before it.
fn outputs_of<'a>(
    expr: &'a Expr,
    input: &Cow<'a, Value>,
    tolerant: bool,
) -> Result<Vec<Cow<'a, Value>>, EvalError> {
    fn drain<'b>(outputs: Outputs<'b>, tolerant: bool) -> Result<Vec<Cow<'b, Value>>, EvalError> {
        let mut values = Vec::new();
        for output in outputs {
            match output {
                Ok(value) => values.push(value),
                Err(_) if tolerant => break,
                Err(e) => return Err(e),
            }
        }
        Ok(values)
    }

    match input {
        Cow::Borrowed(value) => {
            let value: &'a Value = *value;
            drain(Outputs::new(expr, Cow::Borrowed(value)), tolerant)
        }
        Cow::Owned(value) => Ok(drain(Outputs::new(expr, Cow::Borrowed(value)), tolerant)?
            .into_iter()
            .map(|v| Cow::Owned(v.into_owned()))
            .collect()),
    }
}

fn boolean<'a>(b: bool) -> Cow<'a, Value> {
    Cow::Owned(Value::Boolean(b))
}

/// Every right output against every left output, right operand outermost.
fn compare_outputs<'a>(
    op: CmpOp,
    left: &'a Expr,
    right: &'a Expr,
    input: &Cow<'a, Value>,
) -> Result<Vec<Cow<'a, Value>>, EvalError> {
    let rights = outputs_of(right, input, false)?;
    let lefts = outputs_of(left, input, false)?;

    let mut values = Vec::with_capacity(lefts.len() * rights.len());
    for r in &rights {
        for l in &lefts {
            values.push(boolean(op.holds(compare(l, r))));
        }
    }
    Ok(values)
}

/// `and` (`short_on = false`) or `or` (`short_on = true`): a left output
/// whose truthiness equals `short_on` decides alone.
fn logical_outputs<'a>(
    left: &'a Expr,
    right: &'a Expr,
    input: &Cow<'a, Value>,
    short_on: bool,
) -> Result<Vec<Cow<'a, Value>>, EvalError> {
    let mut values = Vec::new();
    for l in outputs_of(left, input, false)? {
        if l.is_truthy() == short_on {
            values.push(boolean(short_on));
            continue;
        }
        for r in outputs_of(right, input, false)? {
            values.push(boolean(r.is_truthy()));
        }
    }
    Ok(values)
}
