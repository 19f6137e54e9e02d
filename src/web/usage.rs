/// Plain-text help served at `GET /`.
pub const USAGE: &str = r#"Usage: GET /services/{service_name}
Usage: GET /services/{service_name}/current
-------------------------------------------
Response format:
{
  "date": "06-18-2019:20:58:50",
  "version": "a.a.b",
  "restart": false
}

Usage: GET /services/{service_name}/rollback
--------------------------------------------
Response format:
{
  "version": "a.a.a"
}

Usage: POST|PUT /services/{service_name}/version/{version}
Usage: POST|PUT /services/{service_name}/version/{version}/{restart}
--------------------------------------------------------------------
Any non-empty {restart} segment records a restart: the rollback version
is left untouched.

Response format:
{
  "current": {
    "date": "12-30-2020:15:09:05",
    "version": "W.Y.Z",
    "restart": false
  },
  "rollback": {
    "version": "X.Y.Z"
  },
  "history": [
    {
      "date": "12-30-2020:15:09:05",
      "version": "W.Y.Z",
      "restart": false
    },
    {
      "date": "12-29-2020:15:07:05",
      "version": "X.Y.Z",
      "restart": true
    },
    {
      "date": "12-28-2020:15:06:05",
      "version": "X.Y.Z",
      "restart": false
    }
  ]
}

Errors:
{
  "status": "Internal Server Error",
  "error": "..."
}
"#;
