//! 凭券引用解析
//!
//! 二维码 / 深链的编码与投递是外部关注点，这里只负责把三种
//! 字面量形态解码为凭券 ID：
//!
//! 1. 自定义 scheme URI，携带 `id` 查询参数（如 `app://claim?id=XXX`）
//! 2. http(s) URL，携带 `id` 查询参数或 `/claim/<id>` 路径段
//! 3. 裸 token：至少 8 位的字母数字串

use regex::Regex;

/// 凭券引用解码器
///
/// 正则在构造时编译一次，解码器整体可安全共享。
#[derive(Debug)]
pub struct VoucherRefDecoder {
    query_id: Regex,
    claim_path: Regex,
    bare_token: Regex,
}

impl Default for VoucherRefDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl VoucherRefDecoder {
    pub fn new() -> Self {
        Self {
            query_id: Regex::new(r"[?&]id=([A-Za-z0-9]{8,})").unwrap(),
            claim_path: Regex::new(r"^https?://[^?#]*/claim/([A-Za-z0-9]{8,})(?:[?#]|$)").unwrap(),
            bare_token: Regex::new(r"^[A-Za-z0-9]{8,}$").unwrap(),
        }
    }

    /// 从扫码 / 链接载荷中提取凭券 ID
    ///
    /// 无法识别的输入返回 None，由调用方转换为参数校验错误。
    pub fn decode(&self, input: &str) -> Option<String> {
        let input = input.trim();

        if input.contains("://") {
            // URI 形态：任意 scheme 的 id 查询参数优先
            if let Some(captures) = self.query_id.captures(input) {
                return Some(captures[1].to_string());
            }
            // http(s) 专属的 /claim/<id> 路径段
            if let Some(captures) = self.claim_path.captures(input) {
                return Some(captures[1].to_string());
            }
            return None;
        }

        self.bare_token
            .is_match(input)
            .then(|| input.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decoder() -> VoucherRefDecoder {
        VoucherRefDecoder::new()
    }

    #[test]
    fn test_decode_custom_scheme_with_query_id() {
        assert_eq!(
            decoder().decode("tokendrop://claim?id=VCHABC12345"),
            Some("VCHABC12345".to_string())
        );
        // 其他查询参数混排
        assert_eq!(
            decoder().decode("tokendrop://claim?ref=qr&id=VCHABC12345"),
            Some("VCHABC12345".to_string())
        );
    }

    #[test]
    fn test_decode_http_url_with_query_id() {
        assert_eq!(
            decoder().decode("https://example.com/v?id=VCHABC12345"),
            Some("VCHABC12345".to_string())
        );
    }

    #[test]
    fn test_decode_http_url_with_claim_path() {
        assert_eq!(
            decoder().decode("https://example.com/claim/VCHABC12345"),
            Some("VCHABC12345".to_string())
        );
        assert_eq!(
            decoder().decode("http://example.com/app/claim/VCHABC12345?src=qr"),
            Some("VCHABC12345".to_string())
        );
    }

    #[test]
    fn test_decode_bare_token() {
        assert_eq!(
            decoder().decode("VCHABC12345"),
            Some("VCHABC12345".to_string())
        );
        // 两侧空白被忽略
        assert_eq!(
            decoder().decode("  VCHABC12345  "),
            Some("VCHABC12345".to_string())
        );
    }

    #[test]
    fn test_decode_rejects_short_token() {
        assert_eq!(decoder().decode("VCH1234"), None);
        assert_eq!(decoder().decode("https://example.com/claim/short1"), None);
    }

    #[test]
    fn test_decode_rejects_non_alphanumeric() {
        assert_eq!(decoder().decode("VCH_ABC_12345"), None);
        assert_eq!(decoder().decode(""), None);
    }

    #[test]
    fn test_decode_rejects_url_without_id() {
        assert_eq!(decoder().decode("https://example.com/about"), None);
        assert_eq!(decoder().decode("tokendrop://claim?ref=qr"), None);
        // /claim/ 路径段只对 http(s) 有效
        assert_eq!(decoder().decode("ftp://example.com/claim/VCHABC12345"), None);
    }
}
