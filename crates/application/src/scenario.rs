//! The fixed scenario plan.
//!
//! A scenario builds its request from the run context, declares the checks
//! applied to the response and may capture values for later scenarios.

use std::fmt;

use pulse_domain::{RequestSpec, ResponseSpec};
use serde_json::{Value, json};

use crate::validator::Predicate;

type BuildFn = dyn Fn(&RunContext) -> RequestSpec + Send + Sync;
type CaptureFn = dyn Fn(&ResponseSpec, &mut RunContext) + Send + Sync;

/// Values shared between the scenarios of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunContext {
    base_url: String,
    fallback_id: u64,
    created_id: Option<Value>,
}

impl RunContext {
    /// Creates a fresh context. `base_url` must not end with a slash.
    #[must_use]
    pub fn new(base_url: impl Into<String>, fallback_id: u64) -> Self {
        Self {
            base_url: base_url.into(),
            fallback_id,
            created_id: None,
        }
    }

    /// Joins `path` onto the base URL.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// The id returned by the create call, if it was truthy.
    #[must_use]
    pub const fn created_id(&self) -> Option<&Value> {
        self.created_id.as_ref()
    }

    /// Records the id returned by the create call.
    ///
    /// Missing, null, `false`, `0` and empty-string ids are not recorded,
    /// so later scenarios fall back to the configured id.
    pub fn record_created_id(&mut self, id: Option<&Value>) {
        self.created_id = id.filter(|value| is_truthy(value)).map(integral_id);
    }

    /// The post id for dependent scenarios: the created id or the fallback.
    #[must_use]
    pub fn post_id(&self) -> Value {
        self.created_id
            .clone()
            .unwrap_or_else(|| Value::from(self.fallback_id))
    }

    /// `post_id` rendered as a URL path segment.
    #[must_use]
    pub fn post_id_segment(&self) -> String {
        match self.post_id() {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }
}

/// Largest integer an IEEE double holds exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Rewrites whole-number floats (`101.0`, `1e2`) as integers, so the id
/// reads the same in a path segment and in the update payload.
#[allow(clippy::cast_possible_truncation, clippy::float_cmp)]
fn integral_id(value: &Value) -> Value {
    match value {
        Value::Number(n) if !n.is_i64() && !n.is_u64() => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() <= MAX_EXACT_FLOAT_INT)
            .map_or_else(|| value.clone(), |f| Value::from(f as i64)),
        other => other.clone(),
    }
}

/// JSON truthiness: everything except null, `false`, `0`, `NaN` and `""`.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// One named request and validation unit.
pub struct Scenario {
    name: String,
    build: Box<BuildFn>,
    predicates: Vec<Predicate>,
    capture: Option<Box<CaptureFn>>,
}

impl Scenario {
    /// Creates a scenario with the given request builder.
    pub fn new<F>(name: impl Into<String>, build: F) -> Self
    where
        F: Fn(&RunContext) -> RequestSpec + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            build: Box::new(build),
            predicates: Vec::new(),
            capture: None,
        }
    }

    /// Adds a check (builder pattern).
    #[must_use]
    pub fn with_predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    /// Sets the hook run after validation to capture response data.
    #[must_use]
    pub fn with_capture<F>(mut self, capture: F) -> Self
    where
        F: Fn(&ResponseSpec, &mut RunContext) + Send + Sync + 'static,
    {
        self.capture = Some(Box::new(capture));
        self
    }

    /// Scenario name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Checks applied to the response.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Builds the request for the current context.
    #[must_use]
    pub fn build_request(&self, context: &RunContext) -> RequestSpec {
        (self.build)(context)
    }

    /// Lets the scenario record values from its response.
    pub fn capture(&self, response: &ResponseSpec, context: &mut RunContext) {
        if let Some(capture) = &self.capture {
            capture(response, context);
        }
    }
}

impl fmt::Debug for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scenario")
            .field("name", &self.name)
            .field("predicates", &self.predicates)
            .finish_non_exhaustive()
    }
}

/// An ordered list of scenarios executed one after another.
#[derive(Debug)]
pub struct ScenarioPlan {
    scenarios: Vec<Scenario>,
}

impl ScenarioPlan {
    /// The smoke test against a JSONPlaceholder-compatible API:
    /// list users, create a post, update it, delete it.
    #[must_use]
    pub fn standard() -> Self {
        let list_users = Scenario::new("GET /users", |ctx| RequestSpec::get(ctx.url("/users")))
            .with_predicate(Predicate::status_is("status 200 OK", 200))
            .with_predicate(Predicate::new("response contains users", |r| {
                r.body.as_array().is_some_and(|users| !users.is_empty())
            }));

        let create_post = Scenario::new("POST /posts", |ctx| {
            RequestSpec::post(
                ctx.url("/posts"),
                json!({"title": "New Post", "body": "Test content", "userId": 1}),
            )
        })
        .with_predicate(Predicate::status_is("status 201 Created", 201))
        .with_predicate(Predicate::new("post id generated", |r| {
            r.field("id").is_some_and(is_truthy)
        }))
        .with_capture(|r, ctx| ctx.record_created_id(r.field("id")));

        let update_post = Scenario::new("PUT /posts/{id}", |ctx| {
            RequestSpec::put(
                ctx.url(&format!("/posts/{}", ctx.post_id_segment())),
                json!({
                    "id": ctx.post_id(),
                    "title": "Updated",
                    "body": "New content",
                    "userId": 1,
                }),
            )
        })
        .with_predicate(Predicate::status_is("status 200 OK", 200))
        .with_predicate(Predicate::new("title updated", |r| {
            r.field("title").and_then(Value::as_str) == Some("Updated")
        }));

        let delete_post = Scenario::new("DELETE /posts/{id}", |ctx| {
            RequestSpec::delete(ctx.url(&format!("/posts/{}", ctx.post_id_segment())))
        })
        .with_predicate(Predicate::status_in("status 200 or 204", &[200, 204]));

        Self::new(vec![list_users, create_post, update_post, delete_post])
    }

    pub(crate) const fn new(scenarios: Vec<Scenario>) -> Self {
        Self { scenarios }
    }

    /// Iterates over the scenarios in execution order.
    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    /// Number of scenarios.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Returns true if the plan has no scenarios.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}
