// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

/// Generate a pool of client identifiers.
pub fn generate_client_ids(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("client-{i:04}")).collect()
}

/// Ordinary queries a real user would send.
pub fn benign_queries() -> Vec<&'static str> {
    vec![
        "台北到花蓮的火車",
        "明天早上從台中到高雄",
        "自強號 152 次時刻表",
        "板橋到新竹 下午 3 點以後",
        "Taipei to Hualien tomorrow",
        "南港（新）到台東的區間車",
    ]
}

/// Benign context strings.
pub fn benign_contexts() -> Vec<&'static str> {
    vec!["明天早上", "下午 出發 要 靠窗", "後天晚上回家", "first train after 6am"]
}

/// Injection payloads the denylist must catch.
pub fn injection_payloads() -> Vec<&'static str> {
    vec![
        "<script>alert(1)</script>",
        "台北<SCRIPT>fetch('//evil')</SCRIPT>",
        "javascript:alert(document.cookie)",
        "VBScript:MsgBox(1)",
        "file:///etc/passwd",
        "<img src=x onerror=alert(1)>",
        "<svg onload = alert(1)>",
        "data:text/html;base64,PHNjcmlwdD5hbGVydCgxKTwvc2NyaXB0Pg==",
        "data:text/html;charset=utf-8;base64,PHNjcmlwdD4=",
        "\\x3cscript\\x3e",
        "台北\0花蓮",
    ]
}

/// Injection markers written with compatibility look-alikes.
pub fn fullwidth_payloads() -> Vec<&'static str> {
    vec![
        "＜ｓｃｒｉｐｔ＞alert(1)",
        "ｊａｖａｓｃｒｉｐｔ：alert(1)",
        "ｆｉｌｅ：／／／etc/passwd",
    ]
}

/// Context strings dominated by one token (unique/total <= 0.2).
pub fn repetitive_contexts() -> Vec<String> {
    vec![
        "快 ".repeat(10),
        "buy buy buy buy buy buy buy buy buy now".to_string(),
        "a a a a a a a a a b".to_string(),
    ]
}

/// A query `len` characters long.
pub fn oversized_query(len: usize) -> String {
    "台".repeat(len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_client_ids() {
        let ids = generate_client_ids(256);
        assert_eq!(ids.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_oversized_query_counts_chars() {
        assert_eq!(oversized_query(501).chars().count(), 501);
    }
}
