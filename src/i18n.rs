//! Display text for statements in each supported language.
//!
//! The text is built once into an immutable `Translations` value that is handed to whatever
//! renders statements. There is no global table.

use crate::model::Language;

/// Every piece of text a statement needs in one language.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Labels {
    /// The value for the `lang` attribute of the `html` element.
    pub lang: &'static str,
    pub statement_title: &'static str,
    pub customer: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub address: &'static str,
    pub statement_date: &'static str,
    pub account_number: &'static str,
    pub card_number: &'static str,
    pub credit_limit: &'static str,
    pub date: &'static str,
    pub merchant: &'static str,
    pub category: &'static str,
    pub amount: &'static str,
    pub transaction_type: &'static str,
    pub account_summary: &'static str,
    pub total_purchases: &'static str,
    pub total_payments: &'static str,
    pub total_fees: &'static str,
    pub total_credits: &'static str,
    pub current_balance: &'static str,
    pub transaction_details: &'static str,
    pub footer_text: &'static str,
    /// Contains a `{year}` placeholder.
    copyright: &'static str,
    /// The value for the `dir` attribute of the `html` element.
    pub html_dir: &'static str,
    pub font_family: &'static str,
}

impl Labels {
    pub fn copyright(&self, year: i32) -> String {
        self.copyright.replace("{year}", &year.to_string())
    }
}

/// The labels for every `Language`.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Translations {
    /// Indexed in the same order as `Language::ALL`.
    labels: [Labels; 4],
}

impl Default for Translations {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Translations {
    /// The text that ships with the application.
    pub fn builtin() -> Self {
        Self {
            labels: [english(), chinese(), malay(), tamil()],
        }
    }

    pub fn get(&self, language: Language) -> &Labels {
        let ix = match language {
            Language::En => 0,
            Language::Zh => 1,
            Language::Ms => 2,
            Language::Ta => 3,
        };
        &self.labels[ix]
    }

    /// Each language with its labels, in `Language::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (Language, &Labels)> + '_ {
        Language::ALL
            .into_iter()
            .map(move |language| (language, self.get(language)))
    }
}

fn english() -> Labels {
    Labels {
        lang: "en",
        statement_title: "DBS Bank Credit Card Statement",
        customer: "Customer",
        email: "Email",
        phone: "Phone",
        address: "Address",
        statement_date: "Statement Date",
        account_number: "Account Number",
        card_number: "Card Number",
        credit_limit: "Credit Limit",
        date: "Date",
        merchant: "Merchant",
        category: "Category",
        amount: "Amount",
        transaction_type: "Transaction Type",
        account_summary: "Account Summary",
        total_purchases: "Total Purchases",
        total_payments: "Total Payments",
        total_fees: "Total Fees",
        total_credits: "Total Credits",
        current_balance: "Current Balance",
        transaction_details: "Transaction Details",
        footer_text: "This statement is for informational purposes only. For questions or \
            concerns, please contact our customer service.",
        copyright: "© {year} DBS Bank. All rights reserved.",
        html_dir: "ltr",
        font_family: "Helvetica, Arial, sans-serif",
    }
}

fn chinese() -> Labels {
    Labels {
        lang: "zh",
        statement_title: "DBS银行信用卡对账单",
        customer: "客户",
        email: "电子邮件",
        phone: "电话",
        address: "地址",
        statement_date: "对账单日期",
        account_number: "账号",
        card_number: "卡号",
        credit_limit: "信用额度",
        date: "日期",
        merchant: "商家",
        category: "类别",
        amount: "金额",
        transaction_type: "交易类型",
        account_summary: "账户摘要",
        total_purchases: "总购买金额",
        total_payments: "总支付金额",
        total_fees: "总费用",
        total_credits: "总退款",
        current_balance: "当前余额",
        transaction_details: "交易明细",
        footer_text: "此对账单仅供参考。如有疑问或顾虑，请联系我们的客户服务。",
        copyright: "© {year} 星展银行。保留所有权利。",
        html_dir: "ltr",
        font_family: "\"Noto Sans SC\", Helvetica, Arial, sans-serif",
    }
}

fn malay() -> Labels {
    Labels {
        lang: "ms",
        statement_title: "Penyata Kad Kredit Bank DBS",
        customer: "Pelanggan",
        email: "E-mel",
        phone: "Telefon",
        address: "Alamat",
        statement_date: "Tarikh Penyata",
        account_number: "Nombor Akaun",
        card_number: "Nombor Kad",
        credit_limit: "Had Kredit",
        date: "Tarikh",
        merchant: "Peniaga",
        category: "Kategori",
        amount: "Jumlah",
        transaction_type: "Jenis Transaksi",
        account_summary: "Ringkasan Akaun",
        total_purchases: "Jumlah Pembelian",
        total_payments: "Jumlah Pembayaran",
        total_fees: "Jumlah Yuran",
        total_credits: "Jumlah Kredit",
        current_balance: "Baki Semasa",
        transaction_details: "Butiran Transaksi",
        footer_text: "Penyata ini adalah untuk tujuan maklumat sahaja. Untuk pertanyaan atau \
            kebimbangan, sila hubungi perkhidmatan pelanggan kami.",
        copyright: "© {year} Bank DBS. Hak cipta terpelihara.",
        html_dir: "ltr",
        font_family: "Helvetica, Arial, sans-serif",
    }
}

fn tamil() -> Labels {
    Labels {
        lang: "ta",
        statement_title: "DBS வங்கி கடன் அட்டை அறிக்கை",
        customer: "வாடிக்கையாளர்",
        email: "மின்னஞ்சல்",
        phone: "தொலைபேசி",
        address: "முகவரி",
        statement_date: "அறிக்கை தேதி",
        account_number: "கணக்கு எண்",
        card_number: "அட்டை எண்",
        credit_limit: "கடன் வரம்பு",
        date: "தேதி",
        merchant: "வணிகர்",
        category: "வகை",
        amount: "தொகை",
        transaction_type: "பரிவர்த்தனை வகை",
        account_summary: "கணக்கு சுருக்கம்",
        total_purchases: "மொத்த கொள்முதல்கள்",
        total_payments: "மொத்த கொடுப்பனவுகள்",
        total_fees: "மொத்த கட்டணங்கள்",
        total_credits: "மொத்த வரவுகள்",
        current_balance: "தற்போதைய இருப்பு",
        transaction_details: "பரிவர்த்தனை விவரங்கள்",
        footer_text: "இந்த அறிக்கை தகவல் நோக்கங்களுக்காக மட்டுமே. கேள்விகள் அல்லது கவலைகளுக்கு, \
            எங்கள் வாடிக்கையாளர் சேவையைத் தொடர்பு கொள்ளவும்.",
        copyright: "© {year} DBS வங்கி. அனைத்து உரிமைகளும் பாதுகாக்கப்பட்டவை.",
        html_dir: "ltr",
        font_family: "\"Noto Sans Tamil\", Helvetica, Arial, sans-serif",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_language_has_labels() {
        let translations = Translations::builtin();
        let titles: Vec<_> = translations
            .iter()
            .map(|(language, labels)| (language.to_string(), labels.statement_title))
            .collect();
        assert_eq!(titles.len(), Language::ALL.len());
        assert_eq!(titles[0], ("en".to_string(), "DBS Bank Credit Card Statement"));
        assert_eq!(titles[2], ("ms".to_string(), "Penyata Kad Kredit Bank DBS"));
    }

    #[test]
    fn test_lang_matches_language() {
        let translations = Translations::builtin();
        for (language, labels) in translations.iter() {
            assert_eq!(labels.lang, language.to_string());
        }
    }

    #[test]
    fn test_lookup_by_language() {
        let translations = Translations::builtin();
        assert_eq!(translations.get(Language::Zh).merchant, "商家");
        assert_eq!(translations.get(Language::Ta).html_dir, "ltr");
    }

    #[test]
    fn test_copyright_year() {
        let translations = Translations::builtin();
        assert_eq!(
            translations.get(Language::En).copyright(2025),
            "© 2025 DBS Bank. All rights reserved."
        );
        assert!(!translations
            .get(Language::Zh)
            .copyright(2025)
            .contains("{year}"));
    }
}
