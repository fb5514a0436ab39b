//! OpenAPI description of the catalog routes, served at `/api/openapi.json`.
//!
//! Paging parameters come from [`PageParams`]'s `IntoParams` derive; criteria
//! are open-ended `field.operator=value` pairs, so they are listed in each
//! list operation's description instead of as individual parameters.

use convert_case::{Case, Casing};
use utoipa::IntoParams;
use utoipa::openapi::path::{
    HttpMethod, Operation, OperationBuilder, Parameter, ParameterBuilder, ParameterIn, PathItem,
    PathsBuilder,
};
use utoipa::openapi::schema::{ObjectBuilder, Schema, Type};
use utoipa::openapi::{InfoBuilder, OpenApi, OpenApiBuilder, Required, Response, ResponseBuilder};

use crate::criteria::Criteria;
use crate::filter::FilterKind;
use crate::models::PageParams;

fn operators(kind: FilterKind) -> &'static str {
    match kind {
        FilterKind::Range => {
            "equals, notEquals, in, notIn, greaterThan, greaterThanOrEqual, lessThan, \
             lessThanOrEqual, specified"
        }
        FilterKind::String => {
            "equals, notEquals, in, notIn, greaterThan, greaterThanOrEqual, lessThan, \
             lessThanOrEqual, contains, doesNotContain, startsWith, endsWith, specified"
        }
        FilterKind::Boolean => "equals, notEquals, specified",
    }
}

/// Markdown list of the criteria fields of `C` and the operators each accepts.
fn criteria_description<C: Criteria>() -> String {
    let mut description = String::from(
        "Criteria are `field.operator=value` pairs, ANDed together. \
         `in`/`notIn` take comma-separated values. `distinct=false` keeps the \
         duplicate rows association filters can produce.\n\n",
    );
    for field in C::FIELDS {
        description.push_str(&format!(
            "- `{}`: {}\n",
            field.name.to_case(Case::Camel),
            operators(field.kind)
        ));
    }
    description
}

fn response(description: &str) -> Response {
    ResponseBuilder::new().description(description).build()
}

fn id_parameter() -> Parameter {
    ParameterBuilder::new()
        .name("id")
        .parameter_in(ParameterIn::Path)
        .required(Required::True)
        .schema(Some(Schema::Object(
            ObjectBuilder::new().schema_type(Type::Integer).build(),
        )))
        .build()
}

fn list_operation<C: Criteria>(resource: &str) -> Operation {
    OperationBuilder::new()
        .operation_id(Some(format!("list_{}", resource.to_case(Case::Snake))))
        .summary(Some(format!("List {resource} matching the criteria")))
        .description(Some(criteria_description::<C>()))
        .parameters(Some(PageParams::into_params(|| None)))
        .response(
            "200",
            response("One page of matches; `X-Total-Count` and `Link` headers describe the rest"),
        )
        .response("400", response("Unknown field or operator, or an unparseable value"))
        .build()
}

fn count_operation<C: Criteria>(resource: &str) -> Operation {
    OperationBuilder::new()
        .operation_id(Some(format!("count_{}", resource.to_case(Case::Snake))))
        .summary(Some(format!("Count {resource} matching the criteria")))
        .description(Some(criteria_description::<C>()))
        .response("200", response("Number of matches"))
        .response("400", response("Unknown field or operator, or an unparseable value"))
        .build()
}

fn get_operation(resource: &str) -> Operation {
    OperationBuilder::new()
        .operation_id(Some(format!("get_{}", resource.to_case(Case::Snake))))
        .summary(Some(format!("Get one of {resource} by ID")))
        .parameter(id_parameter())
        .response("200", response("The requested entity"))
        .response("404", response("No entity with this ID"))
        .build()
}

/// Collects the documented paths of every mounted resource.
pub struct ApiDoc {
    paths: PathsBuilder,
}

impl Default for ApiDoc {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiDoc {
    #[must_use]
    pub fn new() -> Self {
        Self {
            paths: PathsBuilder::new(),
        }
    }

    /// Document the list, count and get-by-id routes of `/api/{resource}`.
    #[must_use]
    pub fn resource<C: Criteria>(mut self, resource: &str) -> Self {
        self.paths = self
            .paths
            .path(
                format!("/api/{resource}"),
                PathItem::new(HttpMethod::Get, list_operation::<C>(resource)),
            )
            .path(
                format!("/api/{resource}/count"),
                PathItem::new(HttpMethod::Get, count_operation::<C>(resource)),
            )
            .path(
                format!("/api/{resource}/{{id}}"),
                PathItem::new(HttpMethod::Get, get_operation(resource)),
            );
        self
    }

    #[must_use]
    pub fn build(self) -> OpenApi {
        OpenApiBuilder::new()
            .info(
                InfoBuilder::new()
                    .title(env!("CARGO_PKG_NAME"))
                    .version(env!("CARGO_PKG_VERSION"))
                    .description(Some(env!("CARGO_PKG_DESCRIPTION")))
                    .build(),
            )
            .paths(self.paths.build())
            .build()
    }
}
