use chrono::{Duration as ChronoDuration, Utc};
use comercio_auth::{JwtClaims, Role};
use comercio_core::{TenantId, UserId};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Build app (same router as prod), but bind to an ephemeral port.
        let app = comercio_api::app::build_app(jwt_secret.to_string()).await;
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}/api", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, tenant_id: TenantId, role: Option<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(99),
        tenant_id,
        role,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

#[tokio::test]
async fn health_is_public() {
    let srv = TestServer::spawn("test-secret").await;

    let res = reqwest::Client::new()
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn("test-secret").await;

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/company/1/productos", srv.base_url))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn tenant_context_is_derived_from_token() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, TenantId::new(7), Some(Role::admin()));

    let res = reqwest::Client::new()
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["tenant_id"], json!(7));
    assert_eq!(body["role"], json!("Administrador"));
}

#[tokio::test]
async fn token_for_another_company_cannot_cross_the_path() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;

    let token = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::admin()));

    let res = reqwest::Client::new()
        .get(format!("{}/company/2/productos", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["error"], json!("tenant_isolation"));
}

#[tokio::test]
async fn product_crud_feeds_the_inventory_trail() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::admin()));
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/company/1/productos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Cafe molido",
            "price_cents": 550,
            "stock": 12
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: serde_json::Value = res.json().await.unwrap();
    let code = product["code"].as_i64().unwrap();
    assert_eq!(product["status"], json!("Disponible"));

    // Rename + reprice.
    let res = client
        .put(format!("{}/company/1/productos/{code}", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Cafe molido premium", "price_cents": 600 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    // Stock set through the inventory endpoint.
    let res = client
        .put(format!("{}/company/1/inventario/{code}/stock", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "stock": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let adjusted: serde_json::Value = res.json().await.unwrap();
    assert_eq!(adjusted["stock"], json!(4));

    // The trail carries creation plus one entry per changed field.
    let res = client
        .get(format!("{}/company/1/inventario/historial", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let trail: serde_json::Value = res.json().await.unwrap();
    let fields: Vec<&str> = trail["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"name"));
    assert!(fields.contains(&"price_cents"));
    assert_eq!(fields.iter().filter(|f| **f == "stock").count(), 2);
}

#[tokio::test]
async fn order_lifecycle_moves_stock() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::admin()));
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/company/1/productos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Azucar", "price_cents": 120, "stock": 10 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let product: serde_json::Value = res.json().await.unwrap();
    let product_code = product["code"].as_i64().unwrap();

    let res = client
        .post(format!("{}/company/1/pedidos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "lines": [{ "product": product_code, "quantity": 4 }],
            "pago": { "monto_cents": 480, "metodo": "Efectivo" }
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let order: serde_json::Value = res.json().await.unwrap();
    let order_code = order["code"].as_i64().unwrap();
    assert_eq!(order["status"], json!("Pendiente"));
    assert_eq!(order["total_cents"], json!(480));

    let res = client
        .get(format!("{}/company/1/productos/{product_code}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    assert_eq!(product["stock"], json!(6));

    // Pendiente -> EnProceso -> Entregado -> Devuelto.
    for estado in ["EnProceso", "Entregado", "Devuelto"] {
        let res = client
            .put(format!("{}/company/1/pedidos/{order_code}/estado", srv.base_url))
            .bearer_auth(&token)
            .json(&json!({ "estado": estado }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK, "transition to {estado}");
    }

    // The return handed the stock back.
    let res = client
        .get(format!("{}/company/1/productos/{product_code}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    assert_eq!(product["stock"], json!(10));

    // A returned order is terminal.
    let res = client
        .put(format!("{}/company/1/pedidos/{order_code}/estado", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "estado": "EnProceso" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn insufficient_stock_rejects_the_order() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::employee()));
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/company/1/productos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Harina", "price_cents": 90, "stock": 2 }))
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    let product_code = product["code"].as_i64().unwrap();

    let res = client
        .post(format!("{}/company/1/pedidos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "lines": [{ "product": product_code, "quantity": 5 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    // Nothing was withdrawn.
    let res = client
        .get(format!("{}/company/1/productos/{product_code}", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    assert_eq!(product["stock"], json!(2));
}

#[tokio::test]
async fn employee_role_cannot_manage_staff_or_companies() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let employee = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::employee()));
    let res = client
        .post(format!("{}/company/1/empleados/cargos", srv.base_url))
        .bearer_auth(&employee)
        .json(&json!({ "name": "Vendedor", "role": "Empleado" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    // Company administration is reserved for super administrators.
    let admin = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::admin()));
    let res = client
        .get(format!("{}/empresas", srv.base_url))
        .bearer_auth(&admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let super_admin = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::super_admin()));
    let res = client
        .get(format!("{}/empresas", srv.base_url))
        .bearer_auth(&super_admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn register_then_verify_yields_a_working_session() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    // Seed the company as a super administrator.
    let super_admin = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::super_admin()));
    let res = client
        .post(format!("{}/empresas", srv.base_url))
        .bearer_auth(&super_admin)
        .json(&json!({ "name": "Comercial Andina", "ruc": "1790012345001" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let company: serde_json::Value = res.json().await.unwrap();
    let empresa_codigo = company["code"].as_i64().unwrap();

    // Unknown user: verification answers 404, not 403.
    let res = client
        .post(format!("{}/auth/verify-user-empresa", srv.base_url))
        .json(&json!({ "uid": "ext-uid-1", "empresa_codigo": empresa_codigo }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = client
        .post(format!("{}/auth/register-user-empresa", srv.base_url))
        .json(&json!({
            "uid": "ext-uid-1",
            "name": "Maria Paz",
            "empresa_codigo": empresa_codigo,
            "role": "Administrador"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    // Registering the same user with the same company twice conflicts.
    let res = client
        .post(format!("{}/auth/register-user-empresa", srv.base_url))
        .json(&json!({
            "uid": "ext-uid-1",
            "name": "Maria Paz",
            "empresa_codigo": empresa_codigo
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = client
        .post(format!("{}/auth/verify-user-empresa", srv.base_url))
        .json(&json!({ "uid": "ext-uid-1", "empresa_codigo": empresa_codigo }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let session: serde_json::Value = res.json().await.unwrap();
    assert_eq!(session["company"]["code"], json!(empresa_codigo));
    let token = session["token"].as_str().unwrap();

    // The minted token opens the company's tenant-scoped surface.
    let res = client
        .get(format!("{}/company/{empresa_codigo}/clientes", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn a_user_can_list_every_company_they_belong_to() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let client = reqwest::Client::new();

    let super_admin = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::super_admin()));
    let mut codes = Vec::new();
    for (name, ruc) in [
        ("Comercial Andina", "1790012345001"),
        ("Distribuidora Sur", "0991234567001"),
    ] {
        let res = client
            .post(format!("{}/empresas", srv.base_url))
            .bearer_auth(&super_admin)
            .json(&json!({ "name": name, "ruc": ruc }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let company: serde_json::Value = res.json().await.unwrap();
        codes.push(company["code"].as_i64().unwrap());
    }

    for (code, role) in [(codes[0], "Administrador"), (codes[1], "Empleado")] {
        let res = client
            .post(format!("{}/auth/register-user-empresa", srv.base_url))
            .json(&json!({
                "uid": "ext-uid-2",
                "name": "Carlos Vera",
                "empresa_codigo": code,
                "role": role
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    // The listing is public: it feeds the selection screen before any
    // company-scoped token exists.
    let res = client
        .get(format!("{}/auth/empresas-usuario/ext-uid-2", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["empresa"]["code"], json!(codes[0]));
    assert_eq!(items[0]["role"], json!("Administrador"));
    assert_eq!(items[1]["empresa"]["code"], json!(codes[1]));
    assert_eq!(items[1]["role"], json!("Empleado"));

    let res = client
        .get(format!("{}/auth/empresas-usuario/nobody", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    // A taken RUC reads as unavailable for the registration form.
    let res = client
        .get(format!("{}/empresas/validar-ruc/1790012345001", srv.base_url))
        .bearer_auth(&super_admin)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["disponible"], json!(false));
}

#[tokio::test]
async fn customer_summaries_reflect_orders() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, TenantId::new(1), Some(Role::admin()));
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/company/1/clientes", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "first_name": "Maria",
            "last_name": "Lopez",
            "identification": "0912345678"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    let customer: serde_json::Value = res.json().await.unwrap();
    let customer_code = customer["code"].as_i64().unwrap();

    let res = client
        .post(format!("{}/company/1/productos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({ "name": "Arroz", "price_cents": 150, "stock": 20 }))
        .send()
        .await
        .unwrap();
    let product: serde_json::Value = res.json().await.unwrap();
    let product_code = product["code"].as_i64().unwrap();

    let res = client
        .post(format!("{}/company/1/pedidos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "cliente": customer_code,
            "lines": [{ "product": product_code, "quantity": 3 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = client
        .get(format!("{}/company/1/clientes/resumen", srv.base_url))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    let entry = &body["items"].as_array().unwrap()[0];
    assert_eq!(entry["cliente"]["code"], json!(customer_code));
    assert_eq!(entry["resumen"]["order_count"], json!(1));
    assert_eq!(entry["resumen"]["lifetime_total_cents"], json!(450));
    assert_eq!(entry["resumen"]["open_orders"], json!(1));

    // An order for a customer that does not exist is refused outright.
    let res = client
        .post(format!("{}/company/1/pedidos", srv.base_url))
        .bearer_auth(&token)
        .json(&json!({
            "cliente": 999,
            "lines": [{ "product": product_code, "quantity": 1 }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}
