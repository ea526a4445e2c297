use serde_json::{json, Value};

/// Served under `/swagger/` in development.
pub const DOCUMENT_PATH: &str = "v1/swagger.json";

pub fn document() -> Value {
    let id_parameter = json!({
        "name": "id",
        "in": "path",
        "required": true,
        "schema": { "type": "integer", "format": "int32" }
    });
    let person_body = json!({
        "required": true,
        "content": {
            "application/json": { "schema": { "$ref": "#/components/schemas/Person" } }
        }
    });
    let person_response = |description: &str| {
        json!({
            "description": description,
            "content": {
                "application/json": { "schema": { "$ref": "#/components/schemas/Person" } }
            }
        })
    };
    let validation_response = json!({
        "description": "Bad Request",
        "content": {
            "application/json": {
                "schema": {
                    "type": "array",
                    "items": { "$ref": "#/components/schemas/ValidationFailure" }
                }
            }
        }
    });

    json!({
        "openapi": "3.0.1",
        "info": { "title": "Person API", "version": "v1" },
        "paths": {
            "/people": {
                "get": {
                    "tags": ["People"],
                    "responses": {
                        "200": {
                            "description": "Success",
                            "content": {
                                "application/json": {
                                    "schema": {
                                        "type": "array",
                                        "items": { "$ref": "#/components/schemas/Person" }
                                    }
                                }
                            }
                        }
                    }
                },
                "post": {
                    "tags": ["People"],
                    "requestBody": person_body,
                    "responses": {
                        "201": person_response("Created"),
                        "400": validation_response
                    }
                }
            },
            "/people/{id}": {
                "get": {
                    "tags": ["People"],
                    "parameters": [id_parameter],
                    "responses": {
                        "200": person_response("Success"),
                        "404": { "description": "Not Found" }
                    }
                },
                "put": {
                    "tags": ["People"],
                    "parameters": [id_parameter],
                    "requestBody": person_body,
                    "responses": {
                        "204": { "description": "No Content" },
                        "400": {
                            "description": "Bad Request: `Invalid id` when the path id differs from the body id, validation failures otherwise"
                        }
                    }
                },
                "delete": {
                    "tags": ["People"],
                    "parameters": [id_parameter],
                    "responses": {
                        "204": { "description": "No Content" },
                        "404": { "description": "Not Found" }
                    }
                }
            }
        },
        "components": {
            "schemas": {
                "Person": {
                    "type": "object",
                    "properties": {
                        "id": { "type": "integer", "format": "int32" },
                        "firstName": { "type": "string", "nullable": true, "minLength": 1, "maxLength": 10 },
                        "lastName": { "type": "string", "nullable": true, "minLength": 1, "maxLength": 10 },
                        "age": { "type": "integer", "format": "int32", "minimum": 0, "maximum": 120 }
                    }
                },
                "ValidationFailure": {
                    "type": "object",
                    "properties": {
                        "propertyName": { "type": "string" },
                        "errorMessage": { "type": "string" }
                    }
                }
            }
        }
    })
}
