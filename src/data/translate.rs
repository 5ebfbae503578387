use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use anyhow::{Context, Result};

use crate::error::ConfigError;

/// Built-in Portuguese → English labels for the product categories of the
/// Olist catalogue.
pub const BUILTIN_TRANSLATIONS: &[(&str, &str)] = &[
    ("beleza_saude", "Health & Beauty"),
    ("informatica_acessorios", "Computer Accessories"),
    ("automotivo", "Automotive"),
    ("cama_mesa_banho", "Bed Bath Table"),
    ("moveis_decoracao", "Furniture & Decor"),
    ("esporte_lazer", "Sports & Leisure"),
    ("perfumaria", "Perfumery"),
    ("utilidades_domesticas", "Housewares"),
    ("telefonia", "Mobile Telephony"),
    ("relogios_presentes", "Watches & Gifts"),
    ("alimentos_bebidas", "Food & Drinks"),
    ("bebes", "Baby Products"),
    ("papelaria", "Stationery"),
    ("tablets_impressao_imagem", "Tablets & Image Printing"),
    ("brinquedos", "Toys"),
    ("telefonia_fixa", "Fixed Telephony"),
    ("ferramentas_jardim", "Garden Tools"),
    ("fashion_bolsas_e_acessorios", "Fashion Bags & Accessories"),
    ("eletroportateis", "Small Appliances"),
    ("consoles_games", "Consoles & Games"),
    ("audio", "Audio & Music"),
    ("fashion_calcados", "Fashion Shoes"),
    ("cool_stuff", "Cool Stuff"),
    ("malas_acessorios", "Luggage & Accessories"),
    ("climatizacao", "Air Conditioning"),
    ("construcao_ferramentas_construcao", "Construction Tools"),
    ("moveis_cozinha_area_de_servico_jantar_e_jardim", "Kitchen Dining Garden Furniture"),
    ("construcao_ferramentas_jardim", "Garden Construction Tools"),
    ("fashion_roupa_masculina", "Men Fashion Clothing"),
    ("pet_shop", "Pet Shop"),
    ("moveis_escritorio", "Office Furniture"),
    ("market_place", "Marketplace"),
    ("eletronicos", "Electronics"),
    ("eletrodomesticos", "Home Appliances"),
    ("artigos_de_festas", "Party Supplies"),
    ("casa_conforto", "Home Comfort"),
    ("construcao_ferramentas_ferramentas", "Construction Tools"),
    ("agro_industria_e_comercio", "Agro Industry & Commerce"),
    ("moveis_colchao_e_estofado", "Furniture Mattress & Upholstery"),
    ("livros_tecnicos", "Technical Books"),
    ("casa_construcao", "Home Construction"),
    ("instrumentos_musicais", "Musical Instruments"),
    ("moveis_sala", "Living Room Furniture"),
    ("construcao_ferramentas_iluminacao", "Construction Lighting Tools"),
    ("industria_comercio_e_negocios", "Industry Commerce & Business"),
    ("alimentos", "Food"),
    ("artes", "Arts & Crafts"),
    ("moveis_quarto", "Bedroom Furniture"),
    ("livros_interesse_geral", "General Interest Books"),
    ("construcao_ferramentas_seguranca", "Safety Construction Tools"),
    ("fashion_underwear_e_moda_praia", "Underwear & Beachwear"),
    ("fashion_esporte", "Sport Fashion"),
    ("sinalizacao_e_seguranca", "Signaling & Security"),
    ("pcs", "Personal Computers"),
    ("artigos_de_natal", "Christmas Supplies"),
    ("fashion_roupa_feminina", "Women Fashion Clothing"),
    ("eletrodomesticos_2", "Home Appliances 2"),
    ("livros_importados", "Imported Books"),
    ("bebidas", "Beverages"),
    ("cine_foto", "Photography & Film"),
    ("la_cuisine", "Kitchen Equipment"),
    ("musica", "Music"),
    ("casa_conforto_2", "Home Comfort 2"),
    ("portateis_casa_forno_e_cafe", "Small Appliances Home Oven & Coffee"),
    ("cds_dvds_musicais", "CDs & DVDs Music"),
    ("dvds_blu_ray", "DVDs & Blu-ray"),
    ("flores", "Flowers"),
    ("artes_e_artesanato", "Arts & Craftsmanship"),
    ("fraldas_higiene", "Diapers & Hygiene"),
    ("fashion_roupa_infanto_juvenil", "Children Fashion Clothing"),
    ("seguros_e_servicos", "Insurance & Services"),
];

/// Immutable category label map, handed to the loader.
#[derive(Debug, Clone, Default)]
pub struct TranslationMap {
    entries: HashMap<String, String>,
}

impl TranslationMap {
    pub fn builtin() -> Self {
        BUILTIN_TRANSLATIONS.iter().copied().collect()
    }

    /// Built-in labels overlaid with the entries of a JSON object file
    /// (`{"original": "display", ...}`).
    pub fn builtin_with_overrides(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading translations from {}", path.display()))?;
        let extra: BTreeMap<String, String> = serde_json::from_str(&text)
            .with_context(|| ConfigError::BadTranslations {
                path: path.to_path_buf(),
            })?;

        let mut map = Self::builtin();
        log::debug!("Applying {} translation overrides", extra.len());
        map.entries.extend(extra);
        Ok(map)
    }

    /// Display label for `original`, or `original` itself when unmapped.
    pub fn translate<'a>(&'a self, original: &'a str) -> &'a str {
        self.entries
            .get(original)
            .map(String::as_str)
            .unwrap_or(original)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TranslationMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        TranslationMap {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn mapped_labels_translate_and_unmapped_fall_back() {
        let map = TranslationMap::builtin();
        assert_eq!(map.translate("beleza_saude"), "Health & Beauty");
        assert_eq!(map.translate("pcs"), "Personal Computers");
        assert_eq!(map.translate("not_a_category"), "not_a_category");
        assert_eq!(map.translate(""), "");
    }

    #[test]
    fn builtin_keys_are_unique() {
        let map = TranslationMap::builtin();
        assert_eq!(map.len(), BUILTIN_TRANSLATIONS.len());
    }

    #[test]
    fn overrides_extend_and_replace_builtin_labels() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"pcs": "Computers", "novo": "New"}}"#).unwrap();

        let map = TranslationMap::builtin_with_overrides(file.path()).unwrap();
        assert_eq!(map.translate("pcs"), "Computers");
        assert_eq!(map.translate("novo"), "New");
        assert_eq!(map.translate("bebes"), "Baby Products");
    }

    #[test]
    fn malformed_override_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();

        let err = TranslationMap::builtin_with_overrides(file.path()).unwrap_err();
        assert!(err.to_string().contains("JSON object"));
    }
}
