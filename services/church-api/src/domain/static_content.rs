// 静的コンテンツ（今日の聖句・トレンド楽曲）
//
// どちらも読み取り専用の設定データで、ロジックは日替わり聖句の選択のみ。

use serde::{Deserialize, Serialize};

/// 聖句
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    /// 書名・章・節（例: "John 3:16"）
    pub reference: String,
    /// 本文
    pub text: String,
    /// 訳名（例: "NIV"）
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translation: Option<String>,
}

/// トレンド楽曲
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendingSong {
    pub title: String,
    pub artist: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
}

/// 静的コンテンツ一式
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticContent {
    pub verses: Vec<Verse>,
    pub trending_songs: Vec<TrendingSong>,
}

impl StaticContent {
    /// 指定した通日（1始まり）の聖句を返す
    ///
    /// 聖句リストを日ごとに巡回する。リストが空の場合は`None`。
    pub fn verse_for_day(&self, day_of_year: u32) -> Option<&Verse> {
        if self.verses.is_empty() {
            return None;
        }
        let index = (day_of_year.saturating_sub(1) as usize) % self.verses.len();
        self.verses.get(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(reference: &str) -> Verse {
        Verse {
            reference: reference.to_string(),
            text: "text".to_string(),
            translation: None,
        }
    }

    #[test]
    fn test_verse_for_day_cycles() {
        let content = StaticContent {
            verses: vec![verse("A"), verse("B"), verse("C")],
            trending_songs: vec![],
        };

        assert_eq!(content.verse_for_day(1).unwrap().reference, "A");
        assert_eq!(content.verse_for_day(3).unwrap().reference, "C");
        assert_eq!(content.verse_for_day(4).unwrap().reference, "A");
        assert_eq!(content.verse_for_day(366).unwrap().reference, "C");
    }

    #[test]
    fn test_verse_for_day_empty_list() {
        let content = StaticContent {
            verses: vec![],
            trending_songs: vec![],
        };
        assert!(content.verse_for_day(10).is_none());
    }

    #[test]
    fn test_deserialize_from_json() {
        let content: StaticContent = serde_json::from_str(
            r#"{"verses":[{"reference":"Psalm 23:1","text":"The Lord is my shepherd"}],
                "trendingSongs":[{"title":"Song","artist":"Artist"}]}"#,
        )
        .unwrap();

        assert_eq!(content.verses[0].translation, None);
        assert_eq!(content.trending_songs[0].artist, "Artist");
    }
}
