use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RequestError;
use crate::fetch::FetchClient;
use crate::paging::{Page, PageRequest, PageSource};
use crate::types::{Bill, BillDetail, BillFilter, Member, Sex, Signer};

const BILLS_PATH: &str = "leyes/proyectos";
const MEMBERS_PATH: &str = "congresistas";

/// Rows per `congresistas` page. The endpoint takes only a page index and
/// always answers with this many rows until the last page.
pub const MEMBERS_PAGE_SIZE: usize = 10;

/// Client for the congress REST API.
#[derive(Debug)]
pub struct Congreso {
    http: FetchClient,
    filter: BillFilter,
}

impl Congreso {
    pub fn new(http: FetchClient, filter: BillFilter) -> Self {
        Self { http, filter }
    }

    pub async fn search_bills(
        &self,
        words: Option<&str>,
        row_start: usize,
        page_size: usize,
    ) -> Result<Page<Bill>, RequestError> {
        let body = BillSearchBody {
            per_par_id: self.filter.period_id,
            palabras: words,
            row_start,
            page_size,
            fec_presentacion_desde: self.filter.filed_from,
            fec_presentacion_hasta: self.filter.filed_to,
        };
        let envelope: WsEnvelope<WsBillPage> = self.http.post(BILLS_PATH, &body).await?;
        Ok(bill_page(envelope))
    }

    /// Members are paged by page index; the endpoint reports no total.
    pub async fn list_members(&self, page: usize) -> Result<Page<Member>, RequestError> {
        let members: Vec<WsMember> = self
            .http
            .get(MEMBERS_PATH, Some(&[("page", page.to_string())]))
            .await?;

        Ok(Page {
            items: members.into_iter().map(Member::from).collect(),
            total_count: None,
        })
    }

    /// `Ok(None)` when the API says the bill has no details.
    pub async fn get_bill(&self, number: u64) -> Result<Option<BillDetail>, RequestError> {
        let envelope: WsEnvelope<WsBillDetail> = self
            .http
            .get(&format!("{}/{}", BILLS_PATH, number), None)
            .await?;
        Ok(bill_detail(number, envelope))
    }
}

#[async_trait]
impl PageSource<Bill> for Congreso {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Bill>, RequestError> {
        self.search_bills(request.query.as_deref(), request.offset, request.limit)
            .await
    }
}

#[async_trait]
impl PageSource<Member> for Congreso {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Page<Member>, RequestError> {
        self.list_members(member_page(request.offset)).await
    }
}

fn member_page(offset: usize) -> usize {
    offset / MEMBERS_PAGE_SIZE
}

// Request/response shapes of the congress API

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BillSearchBody<'a> {
    per_par_id: u32,
    palabras: Option<&'a str>,
    row_start: usize,
    page_size: usize,
    fec_presentacion_desde: Option<NaiveDate>,
    fec_presentacion_hasta: Option<NaiveDate>,
}

#[derive(Deserialize)]
struct WsEnvelope<T> {
    code: Option<i64>,
    data: Option<T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsBillPage {
    proyectos: Option<Vec<WsBill>>,
    rows_total: Option<usize>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsBill {
    pley_num: Option<u64>,
    proyecto_ley: Option<String>,
    des_estado: Option<String>,
    fec_presentacion: Option<String>,
    titulo: Option<String>,
    des_proponente: Option<String>,
    autores: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsMember {
    nombre: Option<String>,
    partido: Option<String>,
    email: Option<String>,
}

#[derive(Deserialize)]
struct WsBillDetail {
    general: Option<WsBillGeneral>,
    #[serde(default)]
    firmantes: Vec<WsSigner>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsBillGeneral {
    titulo: Option<String>,
    des_estado: Option<String>,
    fec_presentacion: Option<String>,
    des_proponente: Option<String>,
    des_gpar: Option<String>,
    sumilla: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WsSigner {
    nombre: Option<String>,
    dni: Option<String>,
    sexo: Option<String>,
    pag_web: Option<String>,
}

impl From<WsBill> for Bill {
    fn from(b: WsBill) -> Self {
        let code = b
            .proyecto_ley
            .or_else(|| b.pley_num.map(|n| n.to_string()))
            .unwrap_or_else(|| "?".to_string());
        Bill {
            number: b.pley_num,
            code,
            status: b.des_estado.unwrap_or_default(),
            filed_on: b.fec_presentacion.as_deref().and_then(parse_date),
            title: b.titulo.unwrap_or_default(),
            proponent: b.des_proponente.unwrap_or_default(),
            authors: b.autores.unwrap_or_default(),
        }
    }
}

impl From<WsMember> for Member {
    fn from(m: WsMember) -> Self {
        Member {
            name: m.nombre.unwrap_or_else(|| "unknown".to_string()),
            party: m.partido.unwrap_or_default(),
            email: m.email.unwrap_or_default(),
        }
    }
}

impl From<WsSigner> for Signer {
    fn from(s: WsSigner) -> Self {
        Signer {
            name: s.nombre.unwrap_or_else(|| "unknown".to_string()),
            dni: s.dni.unwrap_or_default(),
            sex: Sex::from_code(s.sexo.as_deref().unwrap_or("")),
            web_page: s.pag_web.filter(|u| !u.trim().is_empty()),
        }
    }
}

/// A response without `data.proyectos` still renders, as an empty final page.
fn bill_page(envelope: WsEnvelope<WsBillPage>) -> Page<Bill> {
    let Some(page) = envelope.data else {
        warn!(code = ?envelope.code, "bill search response has no data");
        return Page::empty();
    };
    let Some(bills) = page.proyectos else {
        warn!(code = ?envelope.code, "bill search response has no proyectos");
        return Page::empty();
    };

    if bills.is_empty() {
        debug!("bill search returned no rows");
    }
    // Rows stay in the page so the cursor keeps matching the server's row offsets.
    let unnumbered = bills.iter().filter(|b| b.pley_num.is_none()).count();
    if unnumbered > 0 {
        warn!(unnumbered, "bill search rows without pleyNum");
    }

    Page {
        items: bills.into_iter().map(Bill::from).collect(),
        total_count: page.rows_total,
    }
}

fn bill_detail(number: u64, envelope: WsEnvelope<WsBillDetail>) -> Option<BillDetail> {
    if envelope.code != Some(200) {
        debug!(number, code = ?envelope.code, "bill detail not found");
        return None;
    }
    let data = envelope.data?;
    let general = data.general?;

    Some(BillDetail {
        number,
        title: general.titulo.unwrap_or_default(),
        status: general.des_estado.unwrap_or_default(),
        filed_on: general.fec_presentacion.as_deref().and_then(parse_date),
        proponent: general.des_proponente.unwrap_or_default(),
        parliamentary_group: general.des_gpar.unwrap_or_default(),
        summary: general.sumilla.unwrap_or_default(),
        signers: data.firmantes.into_iter().map(Signer::from).collect(),
    })
}

/// Dates come as "2025-02-28T00:00:00.000-0500"; keep the calendar day as filed.
fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f%z")
        .or_else(|_| DateTime::parse_from_rfc3339(s))
        .map(|d| d.date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s.get(..10)?, "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use crate::paging::{FetchKind, PagedList};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_api_dates() {
        assert_eq!(parse_date("2025-02-28T00:00:00.000-0500"), Some(date(2025, 2, 28)));
        assert_eq!(parse_date("2024-11-03T10:15:00Z"), Some(date(2024, 11, 3)));
        assert_eq!(parse_date("2023-07-01"), Some(date(2023, 7, 1)));
        assert_eq!(parse_date("yesterday"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn search_body_uses_api_field_names() {
        let body = BillSearchBody {
            per_par_id: 2021,
            palabras: None,
            row_start: 20,
            page_size: 10,
            fec_presentacion_desde: Some(date(2024, 1, 1)),
            fec_presentacion_hasta: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "perParId": 2021,
                "palabras": null,
                "rowStart": 20,
                "pageSize": 10,
                "fecPresentacionDesde": "2024-01-01",
                "fecPresentacionHasta": null
            })
        );
    }

    #[test]
    fn bill_page_maps_rows_and_total() {
        let envelope: WsEnvelope<WsBillPage> = serde_json::from_value(json!({
            "code": 200,
            "data": {
                "rowsTotal": 2,
                "proyectos": [
                    {
                        "perParId": 2021,
                        "pleyNum": 10383,
                        "proyectoLey": "10383/2024-CR",
                        "desEstado": "PRESENTADO",
                        "fecPresentacion": "2025-02-28T00:00:00.000-0500",
                        "titulo": "LEY QUE FORTALECE LOS PRINCIPIOS DE TEMPORALIDAD",
                        "desProponente": "Congreso",
                        "autores": "Cavero Alva, Alejandro Enrique"
                    },
                    { "pleyNum": 10382 }
                ]
            }
        }))
        .unwrap();

        let page = bill_page(envelope);
        assert_eq!(page.total_count, Some(2));
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[0].code, "10383/2024-CR");
        assert_eq!(page.items[0].filed_on, Some(date(2025, 2, 28)));
        assert_eq!(page.items[1].code, "10382");
        assert_eq!(page.items[1].filed_on, None);
    }

    #[test]
    fn missing_proyectos_is_an_empty_final_page() {
        let no_data: WsEnvelope<WsBillPage> =
            serde_json::from_value(json!({ "code": 500 })).unwrap();
        assert_eq!(bill_page(no_data), Page::empty());

        let no_rows: WsEnvelope<WsBillPage> =
            serde_json::from_value(json!({ "data": { "rowsTotal": 40 } })).unwrap();
        assert_eq!(bill_page(no_rows), Page::empty());
    }

    #[test]
    fn bill_detail_found() {
        let envelope: WsEnvelope<WsBillDetail> = serde_json::from_value(json!({
            "code": 200,
            "data": {
                "general": {
                    "titulo": "LEY DE PRUEBA",
                    "desEstado": "EN COMISIÓN",
                    "fecPresentacion": "2025-02-28T00:00:00.000-0500",
                    "desProponente": "Congreso",
                    "desGpar": "Grupo Parlamentario",
                    "sumilla": "Propone modificar..."
                },
                "firmantes": [
                    { "firmanteId": 7, "nombre": "Ana Pérez", "dni": "12345678", "sexo": "F", "pagWeb": "https://example.org/ana" },
                    { "firmanteId": 8, "nombre": "Luis Ramos", "sexo": "M", "pagWeb": "" }
                ]
            }
        }))
        .unwrap();

        let detail = bill_detail(10383, envelope).unwrap();
        assert_eq!(detail.number, 10383);
        assert_eq!(detail.parliamentary_group, "Grupo Parlamentario");
        assert_eq!(detail.signers.len(), 2);
        assert_eq!(detail.signers[0].sex, Sex::Female);
        assert_eq!(detail.signers[0].web_page.as_deref(), Some("https://example.org/ana"));
        assert_eq!(detail.signers[1].web_page, None);
        assert_eq!(detail.signers[1].dni, "");
    }

    #[test]
    fn bill_detail_not_found_signals() {
        let wrong_code: WsEnvelope<WsBillDetail> = serde_json::from_value(json!({
            "code": 404,
            "data": { "general": { "titulo": "X" }, "firmantes": [] }
        }))
        .unwrap();
        assert_eq!(bill_detail(1, wrong_code), None);

        let no_data: WsEnvelope<WsBillDetail> =
            serde_json::from_value(json!({ "code": 200 })).unwrap();
        assert_eq!(bill_detail(1, no_data), None);
    }

    #[test]
    fn member_mapping_fills_gaps() {
        let raw: Vec<WsMember> = serde_json::from_value(json!([
            { "nombre": "Rosa Gutiérrez", "partido": "Partido A", "email": "rgutierrez@congreso.gob.pe", "fotoUrl": "" },
            {}
        ]))
        .unwrap();
        let members: Vec<Member> = raw.into_iter().map(Member::from).collect();
        assert_eq!(members[0].name, "Rosa Gutiérrez");
        assert_eq!(members[0].party, "Partido A");
        assert_eq!(members[1].name, "unknown");
    }

    #[test]
    fn row_without_number_keeps_the_page_renderable() {
        let envelope: WsEnvelope<WsBillPage> = serde_json::from_value(json!({
            "code": 200,
            "data": {
                "rowsTotal": 3,
                "proyectos": [
                    { "pleyNum": 10383, "titulo": "A" },
                    { "titulo": "B", "desEstado": "PRESENTADO" },
                    { "pleyNum": 10381, "proyectoLey": "10381/2024-CR" }
                ]
            }
        }))
        .unwrap();

        let page = bill_page(envelope);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[1].number, None);
        assert_eq!(page.items[1].code, "?");
        assert_eq!(page.items[1].title, "B");
        assert_eq!(page.items[2].number, Some(10381));
    }

    fn members(n: usize) -> Page<Member> {
        Page {
            items: (0..n)
                .map(|i| Member {
                    name: format!("Congresista {}", i),
                    party: String::new(),
                    email: String::new(),
                })
                .collect(),
            total_count: None,
        }
    }

    #[test]
    fn member_offsets_map_to_fixed_size_pages() {
        assert_eq!(member_page(0), 0);
        assert_eq!(member_page(MEMBERS_PAGE_SIZE), 1);
        assert_eq!(member_page(3 * MEMBERS_PAGE_SIZE), 3);
    }

    #[test]
    fn full_member_page_keeps_the_list_going() {
        let mut list: PagedList<Member> = PagedList::new(MEMBERS_PAGE_SIZE);
        let first = list.on_debounced_query_change("").unwrap();
        assert_eq!(member_page(first.offset), 0);
        list.apply(first.seq, Ok(members(MEMBERS_PAGE_SIZE)));
        assert!(list.cursor().has_more);

        let next = list.load_more().unwrap();
        assert_eq!(member_page(next.offset), 1);
        list.apply(next.seq, Ok(members(4)));
        assert!(!list.cursor().has_more);
        assert_eq!(list.items().len(), MEMBERS_PAGE_SIZE + 4);
    }

    #[tokio::test]
    async fn member_fetch_requests_next_page_index() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let body = r#"[{"nombre":"Rosa Gutiérrez"}]"#;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8_lossy(&buf[..n]).into_owned()
        });

        let http = FetchClient::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
        let api = Congreso::new(
            http,
            BillFilter {
                period_id: 2021,
                filed_from: None,
                filed_to: None,
            },
        );
        let request = PageRequest {
            seq: 2,
            kind: FetchKind::More,
            query: None,
            offset: MEMBERS_PAGE_SIZE,
            limit: MEMBERS_PAGE_SIZE,
        };
        let page = <Congreso as PageSource<Member>>::fetch_page(&api, &request)
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, None);

        let raw = server.await.unwrap();
        assert!(raw.starts_with("GET /congresistas?page=1 HTTP/1.1"));
    }
}
