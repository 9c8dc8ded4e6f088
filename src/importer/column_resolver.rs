// ==========================================
// 판매/재고 분석 대시보드 - 컬럼 리졸버
// ==========================================
// 용도: 임의의 헤더 집합에서 의미 필드가 들어있는 열을 탐지
// 방식: 정규화(대문자화 + 공백 제거) 후 부분 문자열 매칭.
//       점수화 없이 첫 매칭 열이 승리. 필드별 우선순위는
//       호출 측에서 후보 목록을 시도하는 순서로 표현한다.
// ==========================================

// ==========================================
// Field - 의미 필드 → 후보 키워드 선언 테이블
// ==========================================
// 헤더 어휘가 늘어나면 여기 한 곳만 고치면 된다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// 변환(정규화)된 모델명 열. 일반 모델 열보다 먼저 시도한다.
    TransformedModel,
    Model,
    Qty,
    InvoiceDate,
    Distributor,
    Chipset,
    ItemGroup,
    CategoryType,
    Dealer,
    Product,
    Year,
    Week,
    Month,
    Brand,
    Price,
    Spec,
    Watt,
    Version,
    Status,
    Url,
}

impl Field {
    /// 필드별 후보 키워드 (한국어/영어 혼용 헤더 대응)
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Field::TransformedModel => &["변환 MODEL", "변환MODEL"],
            Field::Model => &["MODEL NAME", "모델명", "ITEM", "MODEL", "제품명"],
            Field::Qty => &["QTY", "수량", "QUANTITY", "SALES"],
            Field::InvoiceDate => &["INVOICE DATE", "판매일", "INVOICE"],
            Field::Distributor => &["업체명", "DISTISUBNAME", "총판", "PARTNER", "DISTRIBUTOR"],
            Field::Chipset => &["칩셋", "CHIPSET"],
            Field::ItemGroup => &["ITEM GROUP", "ITEMGROUP"],
            Field::CategoryType => &["구분", "타입", "TYPE"],
            Field::Dealer => &["변환 DEALER", "변환DEALER", "판매처", "DEALER"],
            Field::Product => &["제품", "품목", "PRODUCT"],
            Field::Year => &["YEAR", "연도"],
            Field::Week => &["주차", "WEEK"],
            Field::Month => &["MONTH", "월"],
            Field::Brand => &["BRAND", "제조사"],
            Field::Price => &["PRICE", "가격", "최저가"],
            Field::Spec => &["SPEC", "규격"],
            Field::Watt => &["WATT"],
            Field::Version => &["VERSION"],
            Field::Status => &["상태", "STATUS"],
            Field::Url => &["URL", "링크"],
        }
    }
}

/// 헤더 정규화: 대문자화 + 모든 공백 제거
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_uppercase()
}

/// 후보 키워드 목록으로 헤더를 탐지한다.
///
/// 정규화된 헤더가 정규화된 후보를 부분 문자열로 포함하면 매칭.
/// 헤더 배열 순서대로 검사하며 첫 매칭을 반환한다.
pub fn resolve<'a>(headers: &'a [String], candidates: &[&str]) -> Option<&'a str> {
    let normalized_candidates: Vec<String> = candidates.iter().map(|c| normalize(c)).collect();
    headers.iter().map(String::as_str).find(|header| {
        let norm = normalize(header);
        normalized_candidates.iter().any(|c| norm.contains(c.as_str()))
    })
}

/// 선언 테이블 기반 단일 필드 탐지
pub fn resolve_field<'a>(headers: &'a [String], field: Field) -> Option<&'a str> {
    resolve(headers, field.candidates())
}

/// 여러 필드를 우선순위 순서로 시도해 첫 성공을 반환한다.
///
/// 예: 모델명은 변환 열이 있으면 그것을, 없으면 일반 모델 열을 쓴다.
pub fn resolve_first<'a>(headers: &'a [String], fields: &[Field]) -> Option<&'a str> {
    fields.iter().find_map(|f| resolve_field(headers, *f))
}
