//! OpenAPI 3.1 documents for the users, requests and replies resources.
//!
//! Each resource gets its own document at `/api-docs-<resource>/openapi.json`
//! and a Swagger UI page at `/api-docs-<resource>`. Body and response schemas
//! come from the wire types through schemars.

use std::sync::Arc;

use axum::{Json, Router, response::Html, routing::get};
use schemars::{JsonSchema, schema_for};
use serde_json::{Map, Value, json};

use tabhub_types::api::{
    CreateTabRequest, ErrorBody, LoginRequest, MessageResponse, ReplyCreated, SignupRequest,
    SignupResponse,
};
use tabhub_types::models::{Reply, TabRequest, User};

use crate::state::AppState;
use crate::upload::PDF_FIELD;

pub const USERS_DOCS: &str = "/api-docs-users";
pub const REQUESTS_DOCS: &str = "/api-docs-requests";
pub const REPLIES_DOCS: &str = "/api-docs-replies";

pub fn routes() -> Router<AppState> {
    let documents = [
        (USERS_DOCS, users_document()),
        (REQUESTS_DOCS, requests_document()),
        (REPLIES_DOCS, replies_document()),
    ];

    let mut router = Router::new();
    for (base, document) in documents {
        let spec_url = format!("{base}/openapi.json");
        let page = SWAGGER_HTML.replace("{spec_url}", &spec_url);
        let document = Arc::new(document);

        router = router
            .route(
                base,
                get(move || {
                    let page = page.clone();
                    async move { Html(page) }
                }),
            )
            .route(
                &spec_url,
                get(move || {
                    let document = document.clone();
                    async move { Json((*document).clone()) }
                }),
            );
    }
    router
}

pub fn users_document() -> Value {
    let mut doc = Document::new("APIs For Users", "API Documentation Users");
    let user = doc.schema::<User>();
    let signup = doc.schema::<SignupRequest>();
    let created = doc.schema::<SignupResponse>();
    let login = doc.schema::<LoginRequest>();
    let message = doc.schema::<MessageResponse>();

    doc.add(
        "get",
        "/api/users",
        Operation::new("listUsers", "List every user")
            .response(200, "All users", Some(array_of(&user))),
    );
    doc.add(
        "post",
        "/api/users",
        Operation::new("createUser", "Sign up a new user")
            .json_body(signup)
            .response(201, "User created", Some(created))
            .error(400, "Username already exists or a field is missing"),
    );
    doc.add(
        "post",
        "/api/users/login",
        Operation::new("login", "Check a username and password")
            .json_body(login)
            .response(200, "The matching user", Some(user))
            .error(401, "Invalid username or password"),
    );
    doc.add(
        "put",
        "/api/users/{id}",
        Operation::new("incrementRequestsNum", "Count one more request against a user")
            .path_param("id", "integer")
            .response(200, "Counter updated", Some(message.clone()))
            .error(404, "User not found"),
    );
    doc.add(
        "put",
        "/api/users/replies/{id}",
        Operation::new("incrementRepliesNum", "Count one more reply against a user")
            .path_param("id", "integer")
            .response(200, "Counter updated", Some(message))
            .error(404, "User not found"),
    );
    doc.finish()
}

pub fn requests_document() -> Value {
    let mut doc = Document::new("APIs For Requests", "API Documentation Requests");
    let request = doc.schema::<TabRequest>();
    let create = doc.schema::<CreateTabRequest>();
    let message = doc.schema::<MessageResponse>();

    doc.add(
        "get",
        "/api/requests",
        Operation::new("listRequests", "List every request")
            .response(200, "All requests", Some(array_of(&request))),
    );
    doc.add(
        "post",
        "/api/requests",
        Operation::new("createRequest", "Create a request without touching counters")
            .json_body(create.clone())
            .response(200, "Request created", Some(request.clone()))
            .error(400, "Malformed body"),
    );
    doc.add(
        "post",
        "/api/requests/submit",
        Operation::new("submitRequest", "Create a request and count it against its author")
            .json_body(create)
            .response(200, "Request created", Some(request.clone()))
            .error(400, "Malformed body")
            .error(404, "User not found"),
    );
    doc.add(
        "get",
        "/api/requests/search",
        Operation::new("searchAllRequests", "Empty search, matches every request")
            .response(200, "All requests", Some(array_of(&request))),
    );
    doc.add(
        "get",
        "/api/requests/search/{text}",
        Operation::new("searchRequests", "Case-insensitive search over song, artist and requester")
            .path_param("text", "string")
            .response(200, "Matching requests", Some(array_of(&request))),
    );
    doc.add(
        "get",
        "/api/requests/user/{user_id}",
        Operation::new("getRequestsByUser", "Requests authored by a user")
            .path_param("user_id", "integer")
            .response(200, "The user's requests", Some(array_of(&request))),
    );
    doc.add(
        "get",
        "/api/requests/{id}",
        Operation::new("getRequestById", "Fetch one request")
            .path_param("id", "string")
            .response(200, "The request", Some(request))
            .error(404, "Request not found"),
    );
    doc.add(
        "put",
        "/api/requests/{id}",
        Operation::new("incrementReplyCount", "Count one more reply against a request")
            .path_param("id", "string")
            .response(200, "Counter updated", Some(message))
            .error(404, "Request not found"),
    );
    doc.finish()
}

pub fn replies_document() -> Value {
    let mut doc = Document::new("APIs For Replies", "API Documentation Replies");
    let reply = doc.schema::<Reply>();
    let created = doc.schema::<ReplyCreated>();
    let form = reply_form_schema();

    doc.add(
        "post",
        "/api/replies",
        Operation::new("createReply", "Upload a PDF reply without touching counters")
            .form_body(form.clone())
            .response(200, "Reply stored", Some(created.clone()))
            .error(400, "Missing field or empty PDF")
            .error(413, "Upload exceeds the size limit"),
    );
    doc.add(
        "post",
        "/api/replies/submit",
        Operation::new("submitReply", "Upload a PDF reply and bump both counters")
            .form_body(form)
            .response(200, "Reply stored", Some(created))
            .error(400, "Missing field or empty PDF")
            .error(404, "User or request not found")
            .error(413, "Upload exceeds the size limit"),
    );
    doc.add(
        "get",
        "/api/replies/user/{user_id}",
        Operation::new("listRepliesByUser", "Replies authored by a user")
            .path_param("user_id", "integer")
            .response(200, "The user's replies, PDFs in base64", Some(array_of(&reply))),
    );
    doc.add(
        "get",
        "/api/replies/{request_id}",
        Operation::new("listRepliesByRequest", "Replies to a request")
            .path_param("request_id", "string")
            .response(200, "The request's replies, PDFs in base64", Some(array_of(&reply))),
    );
    doc.finish()
}

fn reply_form_schema() -> Value {
    let mut properties = Map::new();
    for name in ["request_id", "username", "comment", "song", "artist"] {
        properties.insert(name.into(), json!({ "type": "string" }));
    }
    properties.insert("userId".into(), json!({ "type": "integer" }));
    properties.insert(PDF_FIELD.into(), json!({ "type": "string", "format": "binary" }));

    json!({
        "type": "object",
        "properties": properties,
        "required": ["request_id", "username", "userId", "song", "artist", PDF_FIELD],
    })
}

fn array_of(item: &Value) -> Value {
    json!({ "type": "array", "items": item })
}

struct Document {
    title: &'static str,
    description: &'static str,
    paths: Map<String, Value>,
    schemas: Map<String, Value>,
}

impl Document {
    fn new(title: &'static str, description: &'static str) -> Self {
        let mut doc = Self {
            title,
            description,
            paths: Map::new(),
            schemas: Map::new(),
        };
        doc.schema::<ErrorBody>();
        doc
    }

    /// Register `T` under `components/schemas` and return a `$ref` to it.
    fn schema<T: JsonSchema>(&mut self) -> Value {
        let name = T::schema_name().into_owned();
        let mut schema = schema_for!(T).to_value();

        if let Some(obj) = schema.as_object_mut() {
            obj.remove("$schema");
            // schemars 1.x nests dependencies under "$defs"
            if let Some(Value::Object(defs)) = obj.remove("$defs") {
                for (def_name, mut def) in defs {
                    rewrite_refs(&mut def);
                    self.schemas.entry(def_name).or_insert(def);
                }
            }
        }
        rewrite_refs(&mut schema);
        self.schemas.insert(name.clone(), schema);

        component_ref(&name)
    }

    fn add(&mut self, method: &str, path: &str, operation: Operation) {
        let entry = self.paths.entry(path.to_string()).or_insert_with(|| json!({}));
        if let Some(obj) = entry.as_object_mut() {
            obj.insert(method.to_string(), operation.finish());
        }
    }

    fn finish(self) -> Value {
        json!({
            "openapi": "3.1.0",
            "info": {
                "title": self.title,
                "description": self.description,
                "version": env!("CARGO_PKG_VERSION"),
            },
            "paths": self.paths,
            "components": { "schemas": self.schemas },
        })
    }
}

struct Operation {
    fields: Map<String, Value>,
    params: Vec<Value>,
    responses: Map<String, Value>,
}

impl Operation {
    fn new(operation_id: &str, summary: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("operationId".into(), json!(operation_id));
        fields.insert("summary".into(), json!(summary));
        Self {
            fields,
            params: Vec::new(),
            responses: Map::new(),
        }
    }

    fn path_param(mut self, name: &str, param_type: &str) -> Self {
        self.params.push(json!({
            "name": name,
            "in": "path",
            "required": true,
            "schema": { "type": param_type },
        }));
        self
    }

    fn json_body(self, schema: Value) -> Self {
        self.body("application/json", schema)
    }

    fn form_body(self, schema: Value) -> Self {
        self.body("multipart/form-data", schema)
    }

    fn body(mut self, media_type: &str, schema: Value) -> Self {
        let mut content = Map::new();
        content.insert(media_type.to_string(), json!({ "schema": schema }));
        self.fields.insert(
            "requestBody".into(),
            json!({ "required": true, "content": content }),
        );
        self
    }

    fn response(mut self, status: u16, description: &str, schema: Option<Value>) -> Self {
        let response = match schema {
            Some(schema) => json!({
                "description": description,
                "content": { "application/json": { "schema": schema } },
            }),
            None => json!({ "description": description }),
        };
        self.responses.insert(status.to_string(), response);
        self
    }

    fn error(self, status: u16, description: &str) -> Self {
        self.response(status, description, Some(component_ref("ErrorBody")))
    }

    fn finish(self) -> Value {
        let mut operation = self.error(500, "Storage failure");
        if !operation.params.is_empty() {
            operation
                .fields
                .insert("parameters".into(), Value::Array(operation.params));
        }
        operation
            .fields
            .insert("responses".into(), Value::Object(operation.responses));
        Value::Object(operation.fields)
    }
}

fn component_ref(name: &str) -> Value {
    json!({ "$ref": format!("#/components/schemas/{name}") })
}

/// Point schemars' `#/$defs/X` references at `#/components/schemas/X`.
fn rewrite_refs(value: &mut Value) {
    match value {
        Value::Object(obj) => {
            if let Some(Value::String(target)) = obj.get_mut("$ref") {
                if let Some(name) = target.strip_prefix("#/$defs/") {
                    *target = format!("#/components/schemas/{name}");
                }
            }
            for v in obj.values_mut() {
                rewrite_refs(v);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(rewrite_refs),
        _ => {}
    }
}

const SWAGGER_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>tabhub API docs</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => {
            window.ui = SwaggerUIBundle({ url: "{spec_url}", dom_id: "#swagger-ui" });
        };
    </script>
</body>
</html>"##;

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_refs(value: &Value, out: &mut Vec<String>) {
        match value {
            Value::Object(obj) => {
                if let Some(Value::String(target)) = obj.get("$ref") {
                    out.push(target.clone());
                }
                obj.values().for_each(|v| collect_refs(v, out));
            }
            Value::Array(items) => items.iter().for_each(|v| collect_refs(v, out)),
            _ => {}
        }
    }

    #[test]
    fn every_reference_resolves() {
        for doc in [users_document(), requests_document(), replies_document()] {
            let mut refs = Vec::new();
            collect_refs(&doc, &mut refs);
            assert!(!refs.is_empty());

            for target in refs {
                let name = target
                    .strip_prefix("#/components/schemas/")
                    .unwrap_or_else(|| panic!("unexpected ref {target}"));
                assert!(
                    doc["components"]["schemas"].get(name).is_some(),
                    "missing schema {name}"
                );
            }
        }
    }

    #[test]
    fn user_schema_uses_wire_names_and_has_no_password() {
        let doc = users_document();
        let props = &doc["components"]["schemas"]["User"]["properties"];
        assert!(props.get("requestsNum").is_some());
        assert!(props.get("repliesNum").is_some());
        assert!(props.get("password").is_none());
    }

    #[test]
    fn each_document_covers_its_own_resource() {
        let users = users_document();
        assert!(users["paths"]["/api/users/login"].get("post").is_some());
        assert!(users["paths"].get("/api/requests").is_none());

        let requests = requests_document();
        assert!(requests["paths"]["/api/requests/{id}"].get("get").is_some());
        assert!(requests["paths"]["/api/requests/{id}"].get("put").is_some());

        let replies = replies_document();
        let form = &replies["paths"]["/api/replies"]["post"]["requestBody"]["content"]["multipart/form-data"]["schema"];
        assert_eq!(form["properties"]["pdf"]["format"], "binary");
    }
}
